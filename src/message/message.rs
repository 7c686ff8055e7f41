use crate::proto::{Flags, MessageType};
use crate::{Body, BodyBuf, MessageKind, ObjectPath, Serial, Signature};

#[cfg(feature = "alloc")]
use crate::MessageBuf;

/// A borrowed D-Bus message.
///
/// This is the borrowed variant of [`MessageBuf`], to convert to a
/// [`MessageBuf`], use [`Message::to_owned`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message<'a> {
    /// The type of the message.
    pub(crate) kind: MessageKind<'a>,
    /// Serial of the message.
    pub(crate) serial: Serial,
    /// Flags in the message.
    pub(crate) flags: Flags,
    /// The interface of the message.
    pub(crate) interface: Option<&'a str>,
    /// The destination of the message.
    pub(crate) destination: Option<&'a str>,
    /// The sender of the message.
    pub(crate) sender: Option<&'a str>,
    /// The body associated with the message.
    pub(crate) body: Body<'a>,
}

impl<'a> Message<'a> {
    /// Construct a method call [`Message`].
    ///
    /// # Examples
    ///
    /// ```
    /// use dbus_wire::{Message, ObjectPath, SendBuf};
    ///
    /// const PATH: &ObjectPath = ObjectPath::new_const(b"/org/freedesktop/DBus");
    ///
    /// let mut send = SendBuf::new();
    ///
    /// let m = send.method_call(PATH, "Hello");
    /// let m2 = Message::method_call(PATH, "Hello", m.serial());
    /// assert_eq!(m, m2);
    /// ```
    pub fn method_call(path: &'a ObjectPath, member: &'a str, serial: Serial) -> Self {
        Self {
            kind: MessageKind::MethodCall { path, member },
            serial,
            flags: Flags::EMPTY,
            interface: None,
            destination: None,
            sender: None,
            body: Body::empty(),
        }
    }

    /// Convert this message into a [`MessageKind::MethodReturn`] message with
    /// an empty body where the reply serial matches that of the current
    /// message.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbus_wire::{Message, MessageKind, ObjectPath, SendBuf};
    ///
    /// const PATH: &ObjectPath = ObjectPath::new_const(b"/org/freedesktop/DBus");
    ///
    /// let mut send = SendBuf::new();
    ///
    /// let m = send.method_call(PATH, "Hello")
    ///     .with_sender("se.tedro.DBusExample")
    ///     .with_destination("org.freedesktop.DBus");
    ///
    /// let m2 = m.method_return(send.next_serial());
    /// assert!(matches!(m2.kind(), MessageKind::MethodReturn { .. }));
    ///
    /// assert_eq!(m.sender(), m2.destination());
    /// assert_eq!(m.destination(), m2.sender());
    /// ```
    pub fn method_return(&self, serial: Serial) -> Self {
        Self {
            kind: MessageKind::MethodReturn {
                reply_serial: self.serial,
            },
            serial,
            flags: Flags::EMPTY,
            interface: None,
            destination: self.sender,
            sender: self.destination,
            body: Body::empty(),
        }
    }

    /// Construct a signal [`Message`].
    ///
    /// # Examples
    ///
    /// ```
    /// use dbus_wire::{Message, ObjectPath, SendBuf};
    ///
    /// const PATH: &ObjectPath = ObjectPath::new_const(b"/org/freedesktop/DBus");
    ///
    /// let mut send = SendBuf::new();
    ///
    /// let m = send.signal(PATH, "Hello");
    /// let m2 = Message::signal(PATH, "Hello", m.serial());
    /// assert_eq!(m, m2);
    /// ```
    #[must_use]
    pub fn signal(path: &'a ObjectPath, member: &'a str, serial: Serial) -> Self {
        Self {
            kind: MessageKind::Signal { path, member },
            serial,
            flags: Flags::EMPTY,
            interface: None,
            destination: None,
            sender: None,
            body: Body::empty(),
        }
    }

    /// Convert this message into a [`MessageKind::Error`] message with
    /// an empty body where the reply serial matches that of the current
    /// message.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbus_wire::{Message, MessageKind, ObjectPath, SendBuf};
    ///
    /// const PATH: &ObjectPath = ObjectPath::new_const(b"/org/freedesktop/DBus");
    ///
    /// let mut send = SendBuf::new();
    ///
    /// let m = send.method_call(PATH, "Hello")
    ///     .with_sender("se.tedro.DBusExample")
    ///     .with_destination("org.freedesktop.DBus");
    ///
    /// let m2 = m.error("org.freedesktop.DBus.UnknownMethod", send.next_serial());
    /// assert!(matches!(m2.kind(), MessageKind::Error { .. }));
    ///
    /// assert_eq!(m.sender(), m2.destination());
    /// assert_eq!(m.destination(), m2.sender());
    /// ```
    #[must_use]
    pub fn error(&self, error_name: &'a str, serial: Serial) -> Self {
        Self {
            kind: MessageKind::Error {
                error_name,
                reply_serial: self.serial,
            },
            serial,
            flags: Flags::EMPTY,
            interface: None,
            destination: self.sender,
            sender: self.destination,
            body: Body::empty(),
        }
    }

    /// Convert into an owned [`MessageBuf`].
    #[cfg(feature = "alloc")]
    #[inline]
    pub fn to_owned(&self) -> MessageBuf {
        MessageBuf {
            kind: self.kind.to_owned(),
            serial: self.serial,
            flags: self.flags,
            interface: self.interface.map(Box::from),
            destination: self.destination.map(Box::from),
            sender: self.sender.map(Box::from),
            body: BodyBuf::from(self.body.clone()),
        }
    }

    /// Get the kind of the message.
    #[must_use]
    pub fn kind(&self) -> MessageKind<'a> {
        self.kind
    }

    /// Modify the body and signature of the message to match that of the
    /// provided body buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbus_wire::{BodyBuf, Message, MessageKind, ObjectPath, SendBuf, Signature};
    ///
    /// const PATH: &ObjectPath = ObjectPath::new_const(b"/org/freedesktop/DBus");
    ///
    /// let mut send = SendBuf::new();
    /// let mut body = BodyBuf::new();
    ///
    /// body.store("Hello World!")?;
    ///
    /// let m = send.method_call(PATH, "Hello")
    ///     .with_body(&body);
    ///
    /// assert!(matches!(m.kind(), MessageKind::MethodCall { .. }));
    /// assert_eq!(m.signature(), Signature::STRING);
    /// # Ok::<_, dbus_wire::Error>(())
    /// ```
    #[must_use]
    pub fn with_body(self, body: &'a BodyBuf) -> Self {
        Self {
            body: body.as_body(),
            ..self
        }
    }

    /// Get a buffer to the body of the message.
    #[must_use]
    pub fn body(&self) -> Body<'a> {
        self.body.clone()
    }

    /// Get the serial of the message.
    #[must_use]
    pub fn serial(&self) -> Serial {
        self.serial
    }

    /// Modify the serial of the message.
    #[must_use]
    pub fn with_serial(self, serial: Serial) -> Self {
        Self { serial, ..self }
    }

    /// Get the flags of the message.
    #[must_use]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Modify the flags of the message.
    #[must_use]
    pub fn with_flags(self, flags: Flags) -> Self {
        Self { flags, ..self }
    }

    /// Get the interface of the message.
    #[must_use]
    pub fn interface(&self) -> Option<&'a str> {
        self.interface
    }

    /// Modify the interface of the message.
    #[must_use]
    pub fn with_interface(self, interface: &'a str) -> Self {
        Self {
            interface: Some(interface),
            ..self
        }
    }

    /// Get the destination of the message.
    #[must_use]
    pub fn destination(&self) -> Option<&'a str> {
        self.destination
    }

    /// Modify the destination of the message.
    #[must_use]
    pub fn with_destination(self, destination: &'a str) -> Self {
        Self {
            destination: Some(destination),
            ..self
        }
    }

    /// Get the sender of the message.
    #[must_use]
    pub fn sender(&self) -> Option<&'a str> {
        self.sender
    }

    /// Modify the sender of the message.
    #[must_use]
    pub fn with_sender(self, sender: &'a str) -> Self {
        Self {
            sender: Some(sender),
            ..self
        }
    }

    /// Get the signature of the message.
    #[must_use]
    pub fn signature(&self) -> &'a Signature {
        self.body.signature()
    }

    pub(crate) fn message_type(&self) -> MessageType {
        match self.kind {
            MessageKind::MethodCall { .. } => MessageType::METHOD_CALL,
            MessageKind::MethodReturn { .. } => MessageType::METHOD_RETURN,
            MessageKind::Error { .. } => MessageType::ERROR,
            MessageKind::Signal { .. } => MessageType::SIGNAL,
        }
    }
}

#[cfg(feature = "alloc")]
impl PartialEq<MessageBuf> for Message<'_> {
    #[inline]
    fn eq(&self, other: &MessageBuf) -> bool {
        self.kind == other.kind.borrow()
            && self.serial == other.serial
            && self.flags == other.flags
            && self.interface == other.interface.as_deref()
            && self.destination == other.destination.as_deref()
            && self.sender == other.sender.as_deref()
            && self.body == other.body
    }
}
