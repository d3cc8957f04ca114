use criterion::{criterion_group, criterion_main, Criterion};
use http::{Response, StatusCode};
use micro_framing::codec::{EntityDeserializer, EntitySerializer, HeadDecoder};
use micro_framing::io::{SessionInputBuffer, SessionOutputBuffer};
use micro_framing::strategy::ContentLengthStrategy;
use std::hint::black_box;
use std::io::{Read, Write};

fn chunked_wire(chunks: usize) -> Vec<u8> {
    let mut wire = Vec::new();
    for _ in 0..chunks {
        wire.extend_from_slice(b"400\r\n");
        wire.extend_from_slice(&[b'x'; 0x400]);
        wire.extend_from_slice(b"\r\n");
    }
    wire.extend_from_slice(b"0\r\n\r\n");
    wire
}

fn bench_head_decoder(c: &mut Criterion) {
    let request = b"GET / HTTP/1.1\r\nHost: localhost\r\nAccept: */*\r\nUser-Agent: bench\r\n\r\n";

    c.bench_function("decode_simple_request_head", |b| {
        b.iter(|| {
            let mut input = SessionInputBuffer::new(&request[..]);
            black_box(HeadDecoder::default().decode_request(&mut input).unwrap());
        });
    });
}

fn bench_chunked_decoder(c: &mut Criterion) {
    let wire = chunked_wire(64);
    let response = Response::builder().header("Transfer-Encoding", "chunked").body(()).unwrap();
    let deserializer = EntityDeserializer::new(ContentLengthStrategy::strict());

    c.bench_function("decode_chunked_64k", |b| {
        let mut body = Vec::with_capacity(64 * 1024);
        b.iter(|| {
            body.clear();
            let mut input = SessionInputBuffer::new(&wire[..]);
            let mut entity = deserializer.deserialize(&mut input, &response).unwrap();
            black_box(entity.content_mut().read_to_end(&mut body).unwrap());
        });
    });
}

fn bench_chunked_encoder(c: &mut Criterion) {
    let response = Response::builder().status(StatusCode::OK).header("Transfer-Encoding", "chunked").body(()).unwrap();
    let serializer = EntitySerializer::new(ContentLengthStrategy::strict());
    let data = [b'x'; 256];

    c.bench_function("encode_chunked_64k", |b| {
        b.iter(|| {
            let mut output = SessionOutputBuffer::new(Vec::with_capacity(70 * 1024));
            let mut writer = serializer.serialize(&mut output, &response).unwrap();
            for _ in 0..256 {
                writer.write_all(&data).unwrap();
            }
            writer.finish().unwrap();
            output.flush().unwrap();
            black_box(output.into_inner());
        });
    });
}

criterion_group!(benches, bench_head_decoder, bench_chunked_decoder, bench_chunked_encoder);
criterion_main!(benches);
