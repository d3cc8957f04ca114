use std::io::{Read, Write};
use std::time::Duration;

use http::{Method, Request, Response, StatusCode};
use tracing::{debug, trace};

use crate::codec::{
    EntityDeserializer, EntityReader, EntitySerializer, EntityWriter, HeadDecoder, HeadEncoder, PayloadDecoder,
};
use crate::config::H1Config;
use crate::ensure;
use crate::io::{ConnectionMetrics, ReadTimeout, SessionInputBuffer, SessionOutputBuffer, is_timeout};
use crate::protocol::{ContentLength, Entity, HttpError, HttpMessage, RequestHeader, ResponseHead};
use crate::strategy::{ConnectionReuseStrategy, ConnectionState, ContentLengthStrategy};

const STALE_CHECK_TIMEOUT: Duration = Duration::from_millis(1);

/// A blocking HTTP/1.1 connection over a reader and a writer.
///
/// `HttpConnection` owns the session buffers of the transport and drives the
/// head codecs and the entity (de)serializers over them:
/// - heads are received with [`receive_request_head`](Self::receive_request_head)
///   / [`receive_response_head`](Self::receive_response_head) and sent with
///   [`send_request_head`](Self::send_request_head) /
///   [`send_response_head`](Self::send_response_head)
/// - bodies are read through [`receive_entity`](Self::receive_entity) and
///   written through [`send_entity`](Self::send_entity) or
///   [`entity_writer`](Self::entity_writer)
///
/// A received body must be read or [drained](EntityReader::drain) before the
/// next head; the entity borrows the connection until then.
///
/// # Type Parameters
///
/// * `R`: The blocking readable side of the transport
/// * `W`: The blocking writable side of the transport
pub struct HttpConnection<R, W> {
    input: SessionInputBuffer<R>,
    output: SessionOutputBuffer<W>,
    head_decoder: HeadDecoder,
    head_encoder: HeadEncoder,
    deserializer: EntityDeserializer,
    serializer: EntitySerializer,
    reuse_strategy: ConnectionReuseStrategy,
    open: bool,
    request_count: u64,
    response_count: u64,
}

impl<R: Read, W: Write> HttpConnection<R, W> {
    /// A server side connection: requests without framing headers have no
    /// body.
    pub fn server(reader: R, writer: W, config: H1Config) -> Self {
        let incoming = ContentLengthStrategy::new(config.strictness()).with_implicit_length(ContentLength::Length(0));
        Self::with_strategies(reader, writer, config, incoming, ContentLengthStrategy::new(config.strictness()))
    }

    /// A client side connection: responses without framing headers are read
    /// until the connection closes.
    pub fn client(reader: R, writer: W, config: H1Config) -> Self {
        let strategy = ContentLengthStrategy::new(config.strictness());
        Self::with_strategies(reader, writer, config, strategy, strategy)
    }

    pub fn with_strategies(
        reader: R,
        writer: W,
        config: H1Config,
        incoming: ContentLengthStrategy,
        outgoing: ContentLengthStrategy,
    ) -> Self {
        let constraints = config.constraints();
        Self {
            input: SessionInputBuffer::from_config(reader, &config),
            output: SessionOutputBuffer::from_config(writer, &config),
            head_decoder: HeadDecoder::new(constraints),
            head_encoder: HeadEncoder,
            deserializer: EntityDeserializer::new(incoming).with_max_trailer_count(constraints.max_header_count),
            serializer: EntitySerializer::new(outgoing).with_chunk_size_hint(config.chunk_size_hint()),
            reuse_strategy: ConnectionReuseStrategy::new(),
            open: true,
            request_count: 0,
            response_count: 0,
        }
    }

    fn ensure_open(&self) -> Result<(), HttpError> {
        ensure!(self.open, HttpError::io(std::io::ErrorKind::NotConnected));
        Ok(())
    }

    /// Reads the next request head; `None` once the peer has closed the
    /// connection.
    pub fn receive_request_head(&mut self) -> Result<Option<RequestHeader>, HttpError> {
        self.ensure_open()?;
        let Some(header) = self.head_decoder.decode_request(&mut self.input)? else {
            self.peer_closed();
            return Ok(None);
        };

        self.request_count += 1;
        debug!(method = %header.method(), uri = %header.uri(), version = ?header.version(), "received request head");
        Ok(Some(header))
    }

    /// Reads the next response head; `None` once the peer has closed the
    /// connection.
    pub fn receive_response_head(&mut self) -> Result<Option<ResponseHead>, HttpError> {
        self.ensure_open()?;
        let Some(head) = self.head_decoder.decode_response(&mut self.input)? else {
            self.peer_closed();
            return Ok(None);
        };

        self.response_count += 1;
        debug!(status = %head.status(), version = ?head.version(), "received response head");
        Ok(Some(head))
    }

    /// Binds a decoder for the body announced by `message` to the input
    /// buffer.
    ///
    /// Framing headers alone decide the body here. A response to `HEAD`, a
    /// `1xx`, `204` or `304` response carries no body whatever its headers
    /// say; read those with [`receive_response_entity`](Self::receive_response_entity).
    pub fn receive_entity<M>(&mut self, message: &M) -> Result<Entity<EntityReader<'_, R>>, HttpError>
    where
        M: HttpMessage + ?Sized,
    {
        self.ensure_open()?;
        self.deserializer.deserialize(&mut self.input, message)
    }

    /// Binds a decoder for the body of a response to a `request_method`
    /// request, taking into account responses that never carry a body.
    pub fn receive_response_entity(
        &mut self,
        request_method: &Method,
        head: &ResponseHead,
    ) -> Result<Entity<EntityReader<'_, R>>, HttpError> {
        self.ensure_open()?;
        if !response_has_body(request_method, head.status()) {
            debug!(method = %request_method, status = %head.status(), "response carries no body");
            let reader = EntityReader::new(&mut self.input, PayloadDecoder::empty());
            return Ok(Entity::from_framing(ContentLength::Length(0), reader));
        }
        self.deserializer.deserialize(&mut self.input, head)
    }

    pub fn send_request_head<T>(&mut self, request: &Request<T>) -> Result<(), HttpError> {
        self.ensure_open()?;
        self.output.encode(&mut self.head_encoder, request)?;
        self.request_count += 1;
        trace!(method = %request.method(), uri = %request.uri(), "sent request head");
        Ok(())
    }

    pub fn send_response_head<T>(&mut self, response: &Response<T>) -> Result<(), HttpError> {
        self.ensure_open()?;
        self.output.encode(&mut self.head_encoder, response)?;
        self.response_count += 1;
        trace!(status = %response.status(), "sent response head");
        Ok(())
    }

    /// Writes the content of `entity` framed as `message` announces, and
    /// finishes the body. Returns the number of content bytes written.
    pub fn send_entity<M, B>(&mut self, message: &M, entity: &mut Entity<B>) -> Result<u64, HttpError>
    where
        M: HttpMessage + ?Sized,
        B: Read,
    {
        self.ensure_open()?;
        self.serializer.serialize_entity(&mut self.output, message, entity)
    }

    /// A writer for streaming the body announced by `message`.
    pub fn entity_writer<M>(&mut self, message: &M) -> Result<EntityWriter<'_, W>, HttpError>
    where
        M: HttpMessage + ?Sized,
    {
        self.ensure_open()?;
        self.serializer.serialize(&mut self.output, message)
    }

    pub fn flush(&mut self) -> Result<(), HttpError> {
        self.output.flush()?;
        Ok(())
    }

    /// Flushes pending output and marks the connection closed. The transport
    /// itself closes when the connection is dropped.
    pub fn close(&mut self) -> Result<(), HttpError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.input.clear();
        debug!(requests = self.request_count, responses = self.response_count, "closing connection");
        self.output.flush()?;
        Ok(())
    }

    /// Whether the connection may carry another exchange after `response`.
    pub fn keep_alive<M, B>(&self, response: &M, entity: Option<&Entity<B>>) -> bool
    where
        M: HttpMessage + ?Sized,
    {
        self.reuse_strategy.keep_alive(response, entity, self)
    }

    pub fn metrics(&self) -> ConnectionMetrics {
        ConnectionMetrics {
            request_count: self.request_count,
            response_count: self.response_count,
            received_bytes: self.input.metrics().bytes_transferred(),
            sent_bytes: self.output.metrics().bytes_transferred(),
        }
    }

    pub fn reset_metrics(&mut self) {
        self.request_count = 0;
        self.response_count = 0;
        self.input.metrics_mut().reset();
        self.output.metrics_mut().reset();
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input.into_inner(), self.output.into_inner())
    }

    fn peer_closed(&mut self) {
        debug!("peer closed connection");
        self.open = false;
    }
}

/// RFC 7230 section 3.3.3: the bodies a response can never have.
fn response_has_body(request_method: &Method, status: StatusCode) -> bool {
    if *request_method == Method::HEAD || status.is_informational() {
        return false;
    }
    if *request_method == Method::CONNECT && status.is_success() {
        return false;
    }
    !matches!(status, StatusCode::NO_CONTENT | StatusCode::NOT_MODIFIED)
}

impl<R: Read + ReadTimeout, W: Write> HttpConnection<R, W> {
    /// Whether an idle connection has been closed by the peer.
    ///
    /// Polls the transport for at most a millisecond. Bytes read while
    /// polling stay buffered for the next head.
    pub fn is_stale(&mut self) -> bool {
        if !self.open {
            return true;
        }
        if self.input.has_buffered_data() {
            return false;
        }

        match self.input.fill_buffer_with_timeout(STALE_CHECK_TIMEOUT) {
            Ok(Some(_)) => false,
            Ok(None) => true,
            Err(e) if is_timeout(&e) => false,
            Err(e) => {
                debug!(cause = %e, "stale check failed");
                true
            }
        }
    }
}

impl<R, W> ConnectionState for HttpConnection<R, W> {
    fn is_open(&self) -> bool {
        self.open
    }
}

impl<R, W> HttpConnection<R, W> {
    pub fn is_open(&self) -> bool {
        self.open
    }
}
