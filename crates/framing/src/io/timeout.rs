use std::io;
use std::net::TcpStream;
use std::time::Duration;

/// A byte source whose blocking reads can be bounded in time.
///
/// Needed only by the probing operations of
/// [`SessionInputBuffer`](super::SessionInputBuffer); in-memory sources never
/// block, so their timeouts are no-ops.
pub trait ReadTimeout {
    fn read_timeout(&self) -> io::Result<Option<Duration>>;

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()>;
}

impl ReadTimeout for TcpStream {
    fn read_timeout(&self) -> io::Result<Option<Duration>> {
        TcpStream::read_timeout(self)
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }
}

impl<T> ReadTimeout for io::Cursor<T> {
    fn read_timeout(&self) -> io::Result<Option<Duration>> {
        Ok(None)
    }

    fn set_read_timeout(&mut self, _timeout: Option<Duration>) -> io::Result<()> {
        Ok(())
    }
}

impl ReadTimeout for &[u8] {
    fn read_timeout(&self) -> io::Result<Option<Duration>> {
        Ok(None)
    }

    fn set_read_timeout(&mut self, _timeout: Option<Duration>) -> io::Result<()> {
        Ok(())
    }
}

impl<T: ReadTimeout + ?Sized> ReadTimeout for &mut T {
    fn read_timeout(&self) -> io::Result<Option<Duration>> {
        (**self).read_timeout()
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        (**self).set_read_timeout(timeout)
    }
}
