mod common;

use std::io::{Cursor, Read, Write};

use http::{HeaderMap, HeaderValue, Request, Response, StatusCode, Version};
use micro_framing::config::H1Config;
use micro_framing::connection::HttpConnection;
use micro_framing::protocol::{Entity, ProtocolError};
use micro_framing::strategy::Strictness;

type Connection = HttpConnection<Cursor<Vec<u8>>, Vec<u8>>;

fn server(wire: Vec<u8>) -> Connection {
    HttpConnection::server(Cursor::new(wire), Vec::new(), H1Config::new(Strictness::Strict))
}

fn client(wire: Vec<u8>) -> Connection {
    HttpConnection::client(Cursor::new(wire), Vec::new(), H1Config::new(Strictness::Strict))
}

#[test]
fn chunked_upload_with_trailers() {
    common::init_tracing();

    let request = Request::put("/files/report.txt")
        .header("Host", "example.com")
        .header("Content-Type", "text/plain")
        .header("Transfer-Encoding", "chunked")
        .body(())
        .unwrap();
    let mut trailers = HeaderMap::new();
    trailers.insert("x-digest", HeaderValue::from_static("sha-256=abc"));

    let mut sender = client(Vec::new());
    sender.send_request_head(&request).unwrap();
    let mut writer = sender.entity_writer(&request).unwrap();
    writer.write_all(b"first line\n").unwrap();
    writer.write_all(b"second line\n").unwrap();
    writer.finish_with_trailers(trailers).unwrap();
    sender.flush().unwrap();
    let (_, wire) = sender.into_inner();

    let mut receiver = server(wire);
    let head = receiver.receive_request_head().unwrap().unwrap();
    assert_eq!(head.uri().path(), "/files/report.txt");

    let mut entity = receiver.receive_entity(&head).unwrap();
    assert!(entity.is_chunked());
    assert_eq!(entity.mime_type(), Some(mime::TEXT_PLAIN));

    let mut body = String::new();
    entity.content_mut().read_to_string(&mut body).unwrap();
    assert_eq!(body, "first line\nsecond line\n");
    assert_eq!(entity.content().trailers().unwrap().get("x-digest").unwrap(), "sha-256=abc");
    drop(entity);

    assert!(receiver.receive_request_head().unwrap().is_none());
    assert!(!receiver.is_open());
}

#[test]
fn exchange_keeps_connection_alive() {
    common::init_tracing();

    let mut server_side = server(b"GET /a HTTP/1.1\r\nHost: x\r\n\r\nGET /b HTTP/1.1\r\nHost: x\r\n\r\n".to_vec());

    for path in ["/a", "/b"] {
        let head = server_side.receive_request_head().unwrap().unwrap();
        assert_eq!(head.uri().path(), path);
        server_side.receive_entity(&head).unwrap().content_mut().drain().unwrap();

        let response = Response::builder().header("Content-Length", "2").body(()).unwrap();
        server_side.send_response_head(&response).unwrap();
        let mut entity = Entity::new(&b"ok"[..]).with_content_length(2);
        assert_eq!(server_side.send_entity(&response, &mut entity).unwrap(), 2);
        assert!(server_side.keep_alive(&response, Some(&entity)));
    }
    server_side.flush().unwrap();

    let metrics = server_side.metrics();
    assert_eq!(metrics.request_count, 2);
    assert_eq!(metrics.response_count, 2);

    let (_, wire) = server_side.into_inner();
    let mut client_side = client(wire);
    for _ in 0..2 {
        let head = client_side.receive_response_head().unwrap().unwrap();
        assert_eq!(head.status(), StatusCode::OK);

        let mut entity = client_side.receive_entity(&head).unwrap();
        let mut body = Vec::new();
        entity.content_mut().read_to_end(&mut body).unwrap();
        assert_eq!(body, b"ok");
    }
    assert_eq!(client_side.metrics().response_count, 2);
}

#[test]
fn close_delimited_response() {
    common::init_tracing();

    let mut client_side = client(b"HTTP/1.0 200 OK\r\nContent-Type: text/html\r\n\r\n<p>bye</p>".to_vec());
    let head = client_side.receive_response_head().unwrap().unwrap();
    assert_eq!(head.version(), Version::HTTP_10);

    let mut entity = client_side.receive_entity(&head).unwrap();
    assert_eq!(entity.content_length(), None);
    assert!(!entity.is_chunked());

    let mut body = String::new();
    entity.content_mut().read_to_string(&mut body).unwrap();
    assert_eq!(body, "<p>bye</p>");

    let detached = entity.without_content();
    drop(entity);
    assert!(!client_side.keep_alive(&head, Some(&detached)));
}

#[test]
fn connection_close_header_ends_reuse() {
    common::init_tracing();

    let connection = server(Vec::new());
    let response = Response::builder().header("Connection", "close").header("Content-Length", "0").body(()).unwrap();
    assert!(!connection.keep_alive(&response, None::<&Entity>));

    let response = Response::builder().version(Version::HTTP_10).header("Connection", "keep-alive").body(()).unwrap();
    assert!(connection.keep_alive(&response, None::<&Entity>));
}

#[test]
fn conflicting_lengths_rejected_by_strict_server() {
    common::init_tracing();

    let mut connection = server(b"POST / HTTP/1.1\r\nContent-Length: 3\r\nContent-Length: 4\r\n\r\nabcd".to_vec());
    let head = connection.receive_request_head().unwrap().unwrap();
    let e = connection.receive_entity(&head).unwrap_err();
    assert!(matches!(e.as_protocol(), Some(ProtocolError::AmbiguousContentLength { .. })));
}

#[test]
fn lax_server_takes_last_valid_length() {
    common::init_tracing();

    let wire = b"POST / HTTP/1.1\r\nContent-Length: 3\r\nContent-Length: 4\r\n\r\nabcd".to_vec();
    let mut connection = HttpConnection::server(Cursor::new(wire), Vec::new(), H1Config::new(Strictness::Lax));
    let head = connection.receive_request_head().unwrap().unwrap();

    let mut entity = connection.receive_entity(&head).unwrap();
    assert_eq!(entity.content_length(), Some(4));
    let mut body = Vec::new();
    entity.content_mut().read_to_end(&mut body).unwrap();
    assert_eq!(body, b"abcd");
}

#[test]
fn closed_connection_refuses_work() {
    common::init_tracing();

    let mut connection = server(b"GET / HTTP/1.1\r\n\r\n".to_vec());
    connection.close().unwrap();
    assert!(!connection.is_open());
    assert!(connection.is_stale());
    assert!(connection.receive_request_head().is_err());

    let response = Response::builder().body(()).unwrap();
    assert!(connection.send_response_head(&response).is_err());
}
