use super::*;
use std::fs::File;
use std::io::Read;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;
use std::task::ready;
use tokio::io::AsyncRead;
use tokio::io::ReadBuf;
use tokio::io::unix::AsyncFd;

/// Line speed of serial readers.
pub const SERIAL_BAUD: libc::speed_t = libc::B9600;
/// `_IOW('E', 0x90, int)`: exclusive access to an input device.
const EVIOCGRAB: u64 = 0x4004_4590;

/// A reader's device node, opened non-blocking and registered with the
/// runtime's reactor.
///
/// Reads wait on readiness rather than parking a blocking thread, so
/// dropping the device (or the runtime) never waits for a card to be tapped.
/// Closing the descriptor also releases a grab.
#[derive(Debug)]
pub struct DeviceFile {
    fd: AsyncFd<File>,
}

impl DeviceFile {
    /// Opens a node for non-blocking reads, without making it the
    /// controlling terminal.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK | libc::O_NOCTTY)
            .open(path)?;
        Ok(Self {
            fd: AsyncFd::new(file)?,
        })
    }
    /// Opens a port and prepares it for its protocol: input devices are
    /// grabbed, serial lines are switched to raw 9600 8N1.
    pub fn connect(port: &Port, protocol: Protocol) -> Result<Self, ReaderError> {
        let connect = |source| ReaderError::Connect {
            path: port.path().to_path_buf(),
            source,
        };
        let device = Self::open(port.path()).map_err(connect)?;
        match protocol {
            Protocol::Keystream => device.grab(),
            Protocol::Serial => device.raw(SERIAL_BAUD),
        }
        .map_err(connect)?;
        Ok(device)
    }
    /// Takes the input device away from every other reader, the console included.
    pub fn grab(&self) -> std::io::Result<()> {
        let grab: libc::c_int = 1;
        check(unsafe { libc::ioctl(self.raw_fd(), EVIOCGRAB as _, grab) })
    }
    /// Raw mode: no echo, no line editing, no CR/LF translation.
    pub fn raw(&self, baud: libc::speed_t) -> std::io::Result<()> {
        let fd = self.raw_fd();
        let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
        check(unsafe { libc::tcgetattr(fd, &mut termios) })?;
        unsafe { libc::cfmakeraw(&mut termios) };
        termios.c_cflag &= !(libc::CSTOPB | libc::PARENB | libc::CRTSCTS);
        termios.c_cflag |= libc::CS8 | libc::CLOCAL | libc::CREAD;
        check(unsafe { libc::cfsetispeed(&mut termios, baud) })?;
        check(unsafe { libc::cfsetospeed(&mut termios, baud) })?;
        check(unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) })?;
        check(unsafe { libc::tcflush(fd, libc::TCIFLUSH) })
    }
    fn raw_fd(&self) -> libc::c_int {
        self.fd.get_ref().as_raw_fd()
    }
}

impl AsyncRead for DeviceFile {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        loop {
            let mut guard = ready!(self.fd.poll_read_ready(cx))?;
            let unfilled = buf.initialize_unfilled();
            match guard.try_io(|inner| inner.get_ref().read(unfilled)) {
                Ok(Ok(n)) => {
                    buf.advance(n);
                    return Poll::Ready(Ok(()));
                }
                Ok(Err(e)) => return Poll::Ready(Err(e)),
                Err(_) => continue,
            }
        }
    }
}

fn check(result: libc::c_int) -> std::io::Result<()> {
    match result {
        -1 => Err(std::io::Error::last_os_error()),
        _ => Ok(()),
    }
}
