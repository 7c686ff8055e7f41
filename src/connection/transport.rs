use core::mem::size_of;
use core::num::NonZeroU32;

use std::env;
use std::ffi::OsStr;
use std::io;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;

use crate::address::{self, Transport as AddressTransport};
use crate::buf::{AlignedBuf, MAX_ARRAY_LENGTH, MAX_BODY_LENGTH, UnalignedBuf, padding_to};
use crate::error::{Error, ErrorKind, Result};
use crate::proto;
use crate::recv_buf::MessageRef;
use crate::{Frame, Handles, RecvBuf, Serial};

#[cfg(feature = "libc")]
use std::os::fd::OwnedFd;

const ENV_STARTER_ADDRESS: &str = "DBUS_STARTER_ADDRESS";
const ENV_SESSION_BUS: &str = "DBUS_SESSION_BUS_ADDRESS";
const ENV_SYSTEM_BUS: &str = "DBUS_SYSTEM_BUS_ADDRESS";
const DEFAULT_SYSTEM_BUS: &str = "unix:path=/var/run/dbus/system_bus_socket";

/// The underlying byte stream backing a [`Transport`].
enum Socket {
    Unix(UnixStream),
    Tcp(TcpStream),
}

impl Socket {
    fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        match self {
            Socket::Unix(stream) => stream.set_nonblocking(nonblocking),
            Socket::Tcp(stream) => stream.set_nonblocking(nonblocking),
        }
    }
}

impl Read for Socket {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Socket::Unix(stream) => stream.read(buf),
            Socket::Tcp(stream) => stream.read(buf),
        }
    }
}

impl Write for Socket {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Socket::Unix(stream) => stream.write(buf),
            Socket::Tcp(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Socket::Unix(stream) => stream.flush(),
            Socket::Tcp(stream) => stream.flush(),
        }
    }
}

impl AsRawFd for Socket {
    fn as_raw_fd(&self) -> RawFd {
        match self {
            Socket::Unix(stream) => stream.as_raw_fd(),
            Socket::Tcp(stream) => stream.as_raw_fd(),
        }
    }
}

/// Maximum number of Unix file descriptors accepted in the ancillary data of
/// a single `recvmsg` call. D-Bus messages rarely carry more than a handful
/// of handles; this bounds the stack buffer used to receive them.
#[cfg(feature = "libc")]
const MAX_ANCILLARY_FDS: usize = 32;

/// A connection to a d-bus session.
pub struct Transport {
    socket: Socket,
    /// The `guid=` property of the address entry that was connected to, if
    /// any, checked against the `OK <guid>` SASL response.
    guid: Option<String>,
    /// Whether `AGREE_UNIX_FD` was negotiated during the SASL handshake.
    /// Only ever `true` on a local (Unix domain) transport.
    fd_passing: bool,
    /// Unix file descriptors accumulated out of ancillary data across the
    /// reads that make up the frame currently being received. Drained into
    /// a [`Handles`] collection once the whole frame has been read.
    #[cfg(feature = "libc")]
    recv_fds: Vec<OwnedFd>,
}

impl Transport {
    /// Construct a new connection to the session bus.
    ///
    /// This uses the `DBUS_SESSION_BUS_ADDRESS` environment variable to
    /// determine its address.
    pub fn session_bus() -> Result<Self> {
        Self::from_env([ENV_STARTER_ADDRESS, ENV_SESSION_BUS], None)
    }

    /// Construct a new connection to the session bus.
    ///
    /// This uses the `DBUS_SYSTEM_BUS_ADDRESS` environment variable to
    /// determine its address or fallback to the well-known address
    /// `unix:path=/var/run/dbus/system_bus_socket`.
    pub fn system_bus() -> Result<Self> {
        Self::from_env(
            [ENV_STARTER_ADDRESS, ENV_SYSTEM_BUS],
            Some(DEFAULT_SYSTEM_BUS),
        )
    }

    /// Construct a new connection to the session bus.
    ///
    /// This uses the `DBUS_SESSION_BUS_ADDRESS` environment variable to
    /// determine its address.
    fn from_env(
        envs: impl IntoIterator<Item: AsRef<OsStr>>,
        default: Option<&str>,
    ) -> Result<Self> {
        let address_storage;

        let address = 'address: {
            for env in envs {
                let Some(address) = env::var_os(env) else {
                    continue;
                };

                address_storage = address;
                break 'address address_storage.as_os_str();
            }

            if let Some(address) = default {
                break 'address OsStr::new(address);
            }

            return Err(Error::new(ErrorKind::MissingBus));
        };

        let address = address.to_str().ok_or(ErrorKind::InvalidAddress)?;
        Self::connect(address)
    }

    /// Connect to the first reachable entry of a D-Bus server address.
    pub(crate) fn connect(address: &str) -> Result<Self> {
        let entries = address::parse(address)?;

        let mut last_error = None;

        for entry in entries {
            let socket = match &entry.transport {
                AddressTransport::Unix(unix) => {
                    UnixStream::connect_addr(&unix_socket_addr(&unix.path)?).map(Socket::Unix)
                }
                AddressTransport::Tcp(tcp) => {
                    TcpStream::connect((tcp.host.as_str(), tcp.port)).map(Socket::Tcp)
                }
            };

            match socket {
                Ok(socket) => {
                    return Ok(Self {
                        socket,
                        guid: entry.guid,
                        fd_passing: false,
                        #[cfg(feature = "libc")]
                        recv_fds: Vec::new(),
                    });
                }
                Err(error) => last_error = Some(error),
            }
        }

        match last_error {
            Some(error) => Err(Error::from(error)),
            None => Err(Error::new(ErrorKind::InvalidAddress)),
        }
    }

    /// The `guid=` property of the connected address entry, if any.
    pub(crate) fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }

    /// Whether this transport runs over a local, trusted channel on which
    /// Unix file descriptor passing (and EXTERNAL auth) make sense.
    pub(crate) fn is_local(&self) -> bool {
        matches!(self.socket, Socket::Unix(..))
    }

    /// Set the connection as non-blocking.
    pub(crate) fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        self.socket.set_nonblocking(nonblocking)
    }

    /// Construct a connection directly from a unix stream.
    pub(crate) fn from_std(stream: UnixStream) -> Self {
        Self {
            socket: Socket::Unix(stream),
            guid: None,
            fd_passing: false,
            #[cfg(feature = "libc")]
            recv_fds: Vec::new(),
        }
    }

    /// Mark whether Unix file descriptor passing was negotiated for this
    /// transport (`AGREE_UNIX_FD` during the SASL handshake). Only has any
    /// effect on a local (Unix domain) transport.
    pub(crate) fn set_fd_passing(&mut self, enabled: bool) {
        self.fd_passing = enabled && self.is_local();
    }

    /// Drain the Unix file descriptors accumulated out of ancillary data
    /// while receiving the frame currently buffered.
    #[cfg(feature = "libc")]
    pub(crate) fn take_recv_fds(&mut self) -> Vec<OwnedFd> {
        core::mem::take(&mut self.recv_fds)
    }

    #[cfg(not(feature = "libc"))]
    pub(crate) fn take_recv_fds(&mut self) -> Vec<std::convert::Infallible> {
        Vec::new()
    }

    /// Receive a sasl response.
    ///
    /// A line (including its terminating `\r\n`) is capped at
    /// [`crate::sasl::MAX_LINE_LENGTH`] bytes, per the SASL profile used by
    /// the D-Bus specification; a peer that never terminates a line within
    /// that bound fails the handshake instead of growing the buffer
    /// unboundedly.
    pub(crate) fn recv_line(&mut self, buf: &mut UnalignedBuf) -> Result<usize> {
        loop {
            if let Some(n) = buf.get().iter().position(|b| *b == b'\n') {
                return Ok(n + 1);
            }

            if buf.get().len() >= crate::sasl::MAX_LINE_LENGTH {
                return Err(Error::new(ErrorKind::LineTooLong));
            }

            buf.reserve_bytes(4096);
            let n = self.socket.read(buf.get_mut())?;

            if n == 0 {
                return Err(Error::from(io::Error::from(io::ErrorKind::UnexpectedEof)));
            }

            buf.advance_mut(n);
        }
    }

    /// Send the contents of the given buffer, attaching any Unix file
    /// descriptors queued alongside it to the first chunk written.
    ///
    /// Descriptor passing is only meaningful (and only implemented) over a
    /// Unix domain socket transport; `fds` is ignored for other transports.
    pub(crate) fn send_buf(&mut self, buf: &mut UnalignedBuf, fds: Vec<OwnedFdOrNothing>) -> Result<()> {
        #[cfg(feature = "libc")]
        {
            let mut fds = fds;

            if !fds.is_empty() && !self.fd_passing {
                return Err(Error::new(ErrorKind::FdPassingUnavailable));
            }

            while !buf.is_empty() {
                if !fds.is_empty() && self.fd_passing {
                    let n = send_with_fds(self.socket.as_raw_fd(), buf.get(), &fds)?;
                    buf.advance(n);
                    fds.clear();
                    continue;
                }

                let n = self.socket.write(buf.get())?;
                buf.advance(n);
            }
        }

        #[cfg(not(feature = "libc"))]
        {
            let _ = fds;

            while !buf.is_empty() {
                let n = self.socket.write(buf.get())?;
                buf.advance(n);
            }
        }

        self.socket.flush()?;
        Ok(())
    }

    pub(crate) fn idle(&mut self, recv: &mut RecvBuf) -> Result<usize> {
        self.recv_buf(
            recv.buf_mut(),
            size_of::<proto::Header>().wrapping_add(size_of::<u32>()),
        )?;

        let mut read_buf = recv.buf().as_aligned();

        let mut header = read_buf.load::<proto::Header>()?;
        let mut headers = read_buf.load::<u32>()?;

        header.adjust(header.endianness);
        headers.adjust(header.endianness);

        if header.body_length > MAX_BODY_LENGTH {
            return Err(Error::new(ErrorKind::BodyTooLong(header.body_length)));
        }

        if headers > MAX_ARRAY_LENGTH {
            return Err(Error::new(ErrorKind::ArrayTooLong(headers)));
        }

        let Some(body_length) = usize::try_from(header.body_length).ok() else {
            return Err(Error::new(ErrorKind::BodyTooLong(header.body_length)));
        };

        let Some(headers) = usize::try_from(headers).ok() else {
            return Err(Error::new(ErrorKind::ArrayTooLong(headers)));
        };

        let serial = Serial::new(NonZeroU32::new(header.serial).ok_or(ErrorKind::ZeroSerial)?);

        // Padding used in the header.
        let total = headers + padding_to::<u64>(headers) + body_length;

        let message_ref = MessageRef {
            serial,
            message_type: header.message_type,
            flags: header.flags,
            headers,
        };

        recv.set_endianness(header.endianness);
        recv.set_last_message(message_ref);
        recv.set_handles(Handles::new());
        Ok(total)
    }

    /// Receive a the remaining body.
    pub(crate) fn recv_body(&mut self, recv: &mut RecvBuf, total: usize) -> Result<()> {
        self.recv_buf(recv.buf_mut(), total)?;
        Ok(())
    }

    /// Receive exactly `n` bytes into the receive buffer.
    pub(crate) fn recv_buf(&mut self, buf: &mut AlignedBuf, n: usize) -> io::Result<()> {
        buf.reserve_bytes(n);

        while buf.len() < n {
            #[cfg(feature = "libc")]
            let read = if self.fd_passing {
                let (read, fds) =
                    recv_with_fds(self.socket.as_raw_fd(), &mut buf.get_mut()[..n])?;
                self.recv_fds.extend(fds);
                read
            } else {
                self.socket.read(&mut buf.get_mut()[..n])?
            };

            #[cfg(not(feature = "libc"))]
            let read = self.socket.read(&mut buf.get_mut()[..n])?;

            if read == 0 {
                return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
            }

            buf.advance(read);
        }

        Ok(())
    }
}

/// Placeholder element type used when the `libc` feature is disabled, since
/// descriptor passing is unavailable without it.
#[cfg(not(feature = "libc"))]
pub(crate) type OwnedFdOrNothing = core::convert::Infallible;
#[cfg(feature = "libc")]
pub(crate) type OwnedFdOrNothing = OwnedFd;

/// Send `data` over `socket`, attaching `fds` as `SCM_RIGHTS` ancillary data.
///
/// Ownership of `fds` stays with the caller; the kernel duplicates the
/// descriptors into the receiving process.
#[cfg(feature = "libc")]
fn send_with_fds(socket: RawFd, data: &[u8], fds: &[OwnedFd]) -> io::Result<usize> {
    use std::mem::{size_of, zeroed};

    debug_assert!(fds.len() <= MAX_ANCILLARY_FDS);

    let fd_len = size_of::<RawFd>() * fds.len();
    let space = unsafe { libc::CMSG_SPACE(fd_len as u32) } as usize;
    let mut cmsg_buf = vec![0u8; space];

    let mut iov = libc::iovec {
        iov_base: data.as_ptr() as *mut _,
        iov_len: data.len(),
    };

    let mut msg: libc::msghdr = unsafe { zeroed() };
    msg.msg_iov = &mut iov;
    msg.msg_iovlen = 1;
    msg.msg_control = cmsg_buf.as_mut_ptr() as *mut _;
    msg.msg_controllen = cmsg_buf.len();

    unsafe {
        let header = libc::CMSG_FIRSTHDR(&msg);
        (*header).cmsg_level = libc::SOL_SOCKET;
        (*header).cmsg_type = libc::SCM_RIGHTS;
        (*header).cmsg_len = libc::CMSG_LEN(fd_len as u32) as _;

        let data_ptr = libc::CMSG_DATA(header) as *mut RawFd;

        for (index, fd) in fds.iter().enumerate() {
            data_ptr.add(index).write_unaligned(fd.as_raw_fd());
        }

        #[cfg(target_os = "linux")]
        let flags = libc::MSG_NOSIGNAL;
        #[cfg(not(target_os = "linux"))]
        let flags = 0;

        let n = libc::sendmsg(socket, &msg, flags);

        if n < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(n as usize)
    }
}

/// Receive into `data` over `socket`, collecting any `SCM_RIGHTS` ancillary
/// data attached to the message.
#[cfg(feature = "libc")]
fn recv_with_fds(socket: RawFd, data: &mut [u8]) -> io::Result<(usize, Vec<OwnedFd>)> {
    use std::mem::{size_of, zeroed};
    use std::os::fd::FromRawFd;

    let fd_len = size_of::<RawFd>() * MAX_ANCILLARY_FDS;
    let space = unsafe { libc::CMSG_SPACE(fd_len as u32) } as usize;
    let mut cmsg_buf = vec![0u8; space];

    let mut iov = libc::iovec {
        iov_base: data.as_mut_ptr() as *mut _,
        iov_len: data.len(),
    };

    let mut msg: libc::msghdr = unsafe { zeroed() };
    msg.msg_iov = &mut iov;
    msg.msg_iovlen = 1;
    msg.msg_control = cmsg_buf.as_mut_ptr() as *mut _;
    msg.msg_controllen = cmsg_buf.len();

    let n = unsafe { libc::recvmsg(socket, &mut msg, 0) };

    if n < 0 {
        return Err(io::Error::last_os_error());
    }

    let mut fds = Vec::new();

    unsafe {
        let mut header = libc::CMSG_FIRSTHDR(&msg);

        while !header.is_null() {
            if (*header).cmsg_level == libc::SOL_SOCKET && (*header).cmsg_type == libc::SCM_RIGHTS
            {
                let payload = (*header).cmsg_len as usize - libc::CMSG_LEN(0) as usize;
                let count = payload / size_of::<RawFd>();
                let data_ptr = libc::CMSG_DATA(header) as *const RawFd;

                for index in 0..count {
                    let raw = data_ptr.add(index).read_unaligned();
                    fds.push(OwnedFd::from_raw_fd(raw));
                }
            }

            header = libc::CMSG_NXTHDR(&msg, header);
        }
    }

    Ok((n as usize, fds))
}

fn unix_socket_addr(path: &[u8]) -> Result<std::os::unix::net::SocketAddr> {
    use std::os::unix::net::SocketAddr;

    if path.first() == Some(&0) {
        #[cfg(target_os = "linux")]
        {
            return SocketAddr::from_abstract_name(&path[1..])
                .map_err(|error| Error::from(io::Error::from(error)));
        }

        #[cfg(not(target_os = "linux"))]
        {
            return Err(Error::new(ErrorKind::InvalidAddress));
        }
    }

    SocketAddr::from_pathname(std::ffi::OsStr::from_bytes(path))
        .map_err(|error| Error::from(io::Error::from(error)))
}

use std::os::unix::ffi::OsStrExt;

impl AsRawFd for Transport {
    #[inline]
    fn as_raw_fd(&self) -> RawFd {
        self.socket.as_raw_fd()
    }
}
