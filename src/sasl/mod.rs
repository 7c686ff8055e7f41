//! Types related to SASL authentication which D-Bus performs.

#[cfg(test)]
mod tests;

use core::fmt;

use crate::lossy_str::LossyStr;

/// Maximum length of a single SASL line, including the terminating `\r\n`, as
/// mandated by the D-Bus specification.
pub(crate) const MAX_LINE_LENGTH: usize = 512;

/// A GUID sent over SASL, as a lowercase hex string without separators.
#[repr(transparent)]
pub(crate) struct Guid([u8]);

impl Guid {
    #[inline]
    pub(crate) fn new(guid: &[u8]) -> &Guid {
        // SAFETY: the byte slice is repr transparent over this type.
        unsafe { &*(guid as *const _ as *const Guid) }
    }

    #[inline]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Guid {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Guid").field(&LossyStr::new(&self.0)).finish()
    }
}

impl PartialEq for Guid {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

/// A SASL command sent by the client.
pub(crate) enum SaslRequest<'a> {
    /// The `AUTH` command, with an optional mechanism and initial response.
    Auth(Auth<'a>),
    /// The `NEGOTIATE_UNIX_FD` command.
    NegotiateUnixFd,
    /// The `BEGIN` command, which ends the SASL exchange.
    Begin,
}

impl<'a> SaslRequest<'a> {
    /// Render this command as a full SASL line, including the trailing
    /// `\r\n`.
    pub(crate) fn write_command(&self, out: &mut Vec<u8>) {
        match self {
            SaslRequest::Auth(auth) => auth.write_command(out),
            SaslRequest::NegotiateUnixFd => out.extend_from_slice(b"NEGOTIATE_UNIX_FD"),
            SaslRequest::Begin => out.extend_from_slice(b"BEGIN"),
        }

        out.extend_from_slice(b"\r\n");
    }
}

/// A SASL response received from the server.
pub(crate) enum SaslResponse<'a> {
    /// `OK <guid>`, authentication succeeded.
    Ok(&'a Guid),
    /// `REJECTED <mechanisms...>`, authentication failed.
    Rejected,
    /// `AGREE_UNIX_FD`, the server accepts descriptor passing.
    AgreeUnixFd,
    /// `ERROR <description>`.
    Error,
}

/// The SASL authentication method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth<'a> {
    /// EXTERNAL authentication with literal payload (hex-encoded uid).
    External(&'a [u8]),
    /// ANONYMOUS authentication, used when EXTERNAL is rejected or the uid
    /// cannot be determined.
    Anonymous,
}

impl<'a> Auth<'a> {
    /// Construct external authentication from the current process uid.
    #[cfg(all(unix, feature = "libc"))]
    pub(crate) fn external_from_uid(buf: &'a mut [u8; 32]) -> Auth<'a> {
        let id = unsafe { libc::getuid() };
        Self::external_from_u32_ascii_hex(buf, id)
    }

    /// Construct an external authentication from a u32.
    ///
    /// The D-Bus EXTERNAL mechanism authenticates using the ASCII decimal
    /// representation of the uid, itself hex-encoded byte by byte.
    pub(crate) fn external_from_u32_ascii_hex(buf: &'a mut [u8; 32], mut id: u32) -> Auth<'a> {
        const HEX: [u8; 16] = *b"0123456789abcdef";

        let mut n = 0;

        if id == 0 {
            buf[0] = b'0';
            buf[1] = b'0';
            n = 2;
        } else {
            while id > 0 {
                let byte = (id % 10) as u8 + b'0';
                buf[n] = HEX[(byte & 0xf) as usize];
                n += 1;
                buf[n] = HEX[(byte >> 4) as usize];
                n += 1;
                id /= 10;
            }
        }

        buf[..n].reverse();
        Auth::External(&buf[..n])
    }

    /// Render this authentication request as the payload of an `AUTH` line
    /// (without the trailing `\r\n`).
    pub(crate) fn write_command(&self, out: &mut Vec<u8>) {
        match self {
            Auth::External(data) => {
                out.extend_from_slice(b"AUTH EXTERNAL ");
                out.extend_from_slice(data);
            }
            Auth::Anonymous => {
                out.extend_from_slice(b"AUTH ANONYMOUS");
            }
        }
    }
}

/// Parse a single SASL response line (without the trailing `\r\n`).
pub(crate) fn parse_response(line: &[u8]) -> crate::error::Result<SaslResponse<'_>> {
    use crate::error::{Error, ErrorKind};

    let line = crate::utils::trim_end(line);

    let Some((command, rest)) = crate::utils::split_once(line, b' ') else {
        return match line {
            b"REJECTED" => Ok(SaslResponse::Rejected),
            b"AGREE_UNIX_FD" => Ok(SaslResponse::AgreeUnixFd),
            _ => Err(Error::new(ErrorKind::InvalidSasl)),
        };
    };

    match command {
        b"OK" => Ok(SaslResponse::Ok(Guid::new(rest))),
        b"REJECTED" => Ok(SaslResponse::Rejected),
        b"ERROR" => Ok(SaslResponse::Error),
        _ => Err(Error::new(ErrorKind::InvalidSaslResponse)),
    }
}
