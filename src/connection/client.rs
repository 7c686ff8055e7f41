use std::collections::HashMap;

use crate::error::{Error, ErrorKind, Result};
use crate::org_freedesktop_dbus;
use crate::{BodyBuf, Buffers, Flags, MatchRule, Message, MessageBuf, MessageKind, ObjectPath, Serial};

use super::{Connection, ConnectionBuilder};

/// An opaque token identifying one [`Client::subscribe`] registration.
///
/// Passed back to [`Client::unsubscribe`] to remove the observer it names.
/// Disposal is idempotent: unsubscribing twice, or unsubscribing after the
/// connection has been dropped, is not an error.
#[derive(Debug)]
pub struct Subscription {
    rule: Box<str>,
    id: u64,
}

type Handler = Box<dyn FnMut(&Message<'_>) + Send>;

struct MatchEntry {
    rule: MatchRule,
    observers: Vec<(u64, Handler)>,
}

/// The outcome of dispatching a frame that completes a pending call.
enum CallOutcome {
    Return(MessageBuf),
    Error(Error),
    Unexpected,
}

/// A D-Bus client built on top of a [`Connection`].
///
/// This is the dispatch core described by the crate's design: it allocates
/// serials, keeps a table of pending method calls keyed by serial, and
/// routes inbound signals to the observers registered through
/// [`subscribe()`](Self::subscribe), coalescing `AddMatch`/`RemoveMatch`
/// across observers that share the same rule.
///
/// Because [`Connection`] is driven by a single poll loop rather than
/// separate reader/writer tasks, `Client` only ever has one outstanding
/// [`call()`](Self::call) at a time: the pending-call table mostly exists to
/// let a reply that arrives for an in-flight call be told apart from signals
/// that precede it in wire order, and to satisfy the teardown invariant that
/// every inserted entry is eventually resolved. Callers who want to issue
/// calls concurrently must serialize access to a single `Client` the same
/// way callers of a bare `Connection` already must (e.g. behind their own
/// `Mutex`).
pub struct Client {
    connection: Connection,
    buf: Buffers,
    pending: HashMap<Serial, ()>,
    registry: HashMap<Box<str>, MatchEntry>,
    next_observer_id: u64,
    unique_name: Option<Box<str>>,
    /// Whether the peer answered `Hello`, i.e. is a bus daemon rather than a
    /// bare peer-to-peer endpoint. Signal subscriptions only issue
    /// `AddMatch`/`RemoveMatch` when this is `true`.
    is_bus: bool,
    disconnected: bool,
}

impl Client {
    /// Connect to the session bus and perform the initial `Hello` exchange.
    pub async fn session_bus() -> Result<Self> {
        Self::connect(ConnectionBuilder::new().session_bus()).await
    }

    /// Connect to the system bus and perform the initial `Hello` exchange.
    pub async fn system_bus() -> Result<Self> {
        Self::connect(ConnectionBuilder::new().system_bus()).await
    }

    /// Build and connect a [`Client`] from a [`ConnectionBuilder`], driving
    /// the SASL handshake and (if the peer is a bus) the `Hello` call to
    /// completion.
    pub async fn connect(builder: &mut ConnectionBuilder) -> Result<Self> {
        let mut connection = builder.build()?;
        let mut buf = Buffers::new();

        connection.connect(&mut buf).await?;

        let mut client = Self {
            connection,
            buf,
            pending: HashMap::new(),
            registry: HashMap::new(),
            next_observer_id: 0,
            unique_name: None,
            is_bus: false,
            disconnected: false,
        };

        client.hello().await?;
        Ok(client)
    }

    /// The unique name assigned by the bus in response to `Hello`, if the
    /// peer answered it (i.e. it is a bus daemon and not a bare peer).
    pub fn unique_name(&self) -> Option<&str> {
        self.unique_name.as_deref()
    }

    /// Whether the remote end identified itself as a bus daemon by
    /// successfully answering `Hello`.
    pub fn is_bus(&self) -> bool {
        self.is_bus
    }

    /// Access the buffers backing this client, for constructing message
    /// bodies ahead of a [`call()`](Self::call) or [`notify()`](Self::notify).
    pub fn buffers(&mut self) -> &mut Buffers {
        &mut self.buf
    }

    /// Construct a method call [`Message`] with a freshly allocated serial.
    pub fn method_call<'a>(&mut self, path: &'a ObjectPath, member: &'a str) -> Message<'a> {
        self.buf.send.method_call(path, member)
    }

    /// Construct a signal [`Message`] with a freshly allocated serial.
    pub fn signal<'a>(&mut self, path: &'a ObjectPath, member: &'a str) -> Message<'a> {
        self.buf.send.signal(path, member)
    }

    async fn hello(&mut self) -> Result<()> {
        let message = self
            .buf
            .send
            .method_call(org_freedesktop_dbus::PATH, "Hello")
            .with_destination(org_freedesktop_dbus::DESTINATION);

        match self.call(message).await {
            Ok(reply) => {
                let mut body = reply.body();

                if body.signature().as_bytes() == b"s" {
                    if let Ok(name) = body.load::<&str>() {
                        self.unique_name = Some(Box::from(name));
                        self.is_bus = true;
                    }
                }

                Ok(())
            }
            // A bare peer-to-peer endpoint has no `org.freedesktop.DBus`
            // object and answers with an error; that is not fatal, it just
            // means this connection never becomes a bus client.
            Err(error) if error.as_dbus_error().is_some() => Ok(()),
            Err(error) => Err(error),
        }
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.disconnected {
            return Err(Error::new(ErrorKind::Disconnected));
        }

        Ok(())
    }

    /// Send a method call and wait for its reply.
    ///
    /// On a well-formed `MethodReturn`, the owned reply message is returned.
    /// On a well-formed `Error`, this returns a [`Dbus`](crate::Error)
    /// failure carrying the error name and, if present, its first string
    /// argument. Any other reply type is a [`Protocol`](crate::Error) error.
    pub async fn call(&mut self, message: Message<'_>) -> Result<MessageBuf> {
        self.ensure_connected()?;

        let no_reply_expected = message.flags() & Flags::NO_REPLY_EXPECTED;
        let serial = message.serial();

        if !no_reply_expected {
            self.pending.insert(serial, ());
        }

        if let Err(error) = self.buf.send.write_message(message) {
            self.pending.remove(&serial);
            return Err(error);
        }

        self.flush().await?;

        if no_reply_expected {
            return Err(Error::new(ErrorKind::UnexpectedReply));
        }

        loop {
            if let Err(error) = self.drive_wait().await {
                self.pending.remove(&serial);
                self.disconnected = true;
                return Err(error);
            }

            match self.dispatch_last_message() {
                Ok(Some((completed, outcome))) if completed == serial => {
                    return match outcome {
                        CallOutcome::Return(reply) => Ok(reply),
                        CallOutcome::Error(error) => Err(error),
                        CallOutcome::Unexpected => Err(Error::new(ErrorKind::UnexpectedReply)),
                    };
                }
                Ok(_) => continue,
                Err(error) => {
                    self.pending.remove(&serial);
                    return Err(error);
                }
            }
        }
    }

    /// Send a message without registering or waiting for a reply.
    ///
    /// Used for one-way notifications such as `RemoveMatch`; the message's
    /// [`Flags::NO_REPLY_EXPECTED`] bit does not need to be set by the
    /// caller, it is implied by using this method instead of
    /// [`call()`](Self::call).
    pub async fn notify(&mut self, message: Message<'_>) -> Result<()> {
        self.ensure_connected()?;
        self.buf.send.write_message(message)?;
        self.flush().await
    }

    async fn flush(&mut self) -> Result<()> {
        if let Err(error) = self.connection.flush(&mut self.buf).await {
            self.disconnected = true;
            return Err(error);
        }

        Ok(())
    }

    async fn drive_wait(&mut self) -> Result<()> {
        self.connection.wait(&mut self.buf).await
    }

    /// Process one incoming frame that has already been received into
    /// `self.buf.recv`: match it against the observer registry, and if it
    /// completes a pending call, remove that call's table entry and report
    /// the serial plus outcome to the caller.
    ///
    /// Observers are matched and invoked *after* the registry has been
    /// consulted for the reply-serial removal, mirroring the ordering
    /// guarantee that a signal preceding a reply in wire order is observed
    /// before that reply's completion is reported.
    fn dispatch_last_message(&mut self) -> Result<Option<(Serial, CallOutcome)>> {
        let message = self.buf.recv.last_message()?;

        let completed = reply_serial_of(&message).and_then(|reply_serial| {
            self.pending
                .remove(&reply_serial)
                .map(|()| (reply_serial, outcome_of(&message)))
        });

        for entry in self.registry.values_mut() {
            if entry.rule.matches(&message) {
                for (_, observer) in entry.observers.iter_mut() {
                    observer(&message);
                }
            }
        }

        Ok(completed)
    }

    /// Receive and dispatch exactly one incoming frame.
    ///
    /// Use this to drive signal delivery on a client that is not currently
    /// inside a [`call()`](Self::call), e.g. in a dedicated receive loop.
    pub async fn dispatch(&mut self) -> Result<()> {
        self.ensure_connected()?;

        if let Err(error) = self.drive_wait().await {
            self.disconnected = true;
            return Err(error);
        }

        self.dispatch_last_message()?;
        Ok(())
    }

    /// Subscribe an observer to messages matching `rule`.
    ///
    /// Multiple observers registered with an identical [`MatchRule`] (by its
    /// canonical rule string) share one server-side `AddMatch` subscription;
    /// only the first subscribing observer for a given rule causes an
    /// `AddMatch` to be sent.
    ///
    /// The `observer` callback runs synchronously, inline with whichever
    /// [`call()`](Self::call) or [`dispatch()`](Self::dispatch) happened to
    /// be receiving when a matching frame arrived; it must not block and
    /// must not call back into this `Client` (post work to your own executor
    /// instead, then call back in afterwards).
    pub async fn subscribe<F>(&mut self, rule: MatchRule, observer: F) -> Result<Subscription>
    where
        F: FnMut(&Message<'_>) + Send + 'static,
    {
        self.ensure_connected()?;

        let rule_string = rule.to_rule_string();
        let id = self.next_observer_id;
        self.next_observer_id += 1;

        if let Some(entry) = self.registry.get_mut(rule_string.as_str()) {
            entry.observers.push((id, Box::new(observer)));
            return Ok(Subscription {
                rule: rule_string.into_boxed_str(),
                id,
            });
        }

        if self.is_bus {
            self.add_match(&rule_string).await?;
        }

        let entry = MatchEntry {
            rule,
            observers: vec![(id, Box::new(observer) as Handler)],
        };

        self.registry.insert(rule_string.clone().into_boxed_str(), entry);

        Ok(Subscription {
            rule: rule_string.into_boxed_str(),
            id,
        })
    }

    /// Remove a previously registered observer.
    ///
    /// Idempotent: removing the same [`Subscription`] twice, or one whose
    /// rule is no longer registered, is a no-op. When the last subscribing
    /// observer for a rule is removed, a best-effort `RemoveMatch` is sent
    /// (`NoReplyExpected`, fire-and-forget) and the match entry is dropped.
    pub async fn unsubscribe(&mut self, subscription: Subscription) -> Result<()> {
        let Some(entry) = self.registry.get_mut(&*subscription.rule) else {
            return Ok(());
        };

        entry.observers.retain(|(id, _)| *id != subscription.id);

        if !entry.observers.is_empty() {
            return Ok(());
        }

        self.registry.remove(&*subscription.rule);

        if self.is_bus {
            self.remove_match(&subscription.rule).await?;
        }

        Ok(())
    }

    async fn add_match(&mut self, rule: &str) -> Result<()> {
        // Built in a buffer of its own, rather than `self.buf.body`: the
        // message below borrows it for the duration of the call, which would
        // otherwise conflict with the `&mut self` that `call()` needs.
        let mut body = BodyBuf::new();
        body.store(rule)?;

        let message = self
            .buf
            .send
            .method_call(org_freedesktop_dbus::PATH, "AddMatch")
            .with_destination(org_freedesktop_dbus::DESTINATION)
            .with_body(&body);

        self.call(message).await?;
        Ok(())
    }

    async fn remove_match(&mut self, rule: &str) -> Result<()> {
        let mut body = BodyBuf::new();
        body.store(rule)?;

        let message = self
            .buf
            .send
            .method_call(org_freedesktop_dbus::PATH, "RemoveMatch")
            .with_destination(org_freedesktop_dbus::DESTINATION)
            .with_body(&body)
            .with_flags(Flags::NO_REPLY_EXPECTED);

        self.notify(message).await
    }
}

fn reply_serial_of(message: &Message<'_>) -> Option<Serial> {
    match message.kind() {
        MessageKind::MethodReturn { reply_serial } => Some(reply_serial),
        MessageKind::Error { reply_serial, .. } => Some(reply_serial),
        _ => None,
    }
}

fn outcome_of(message: &Message<'_>) -> CallOutcome {
    match message.kind() {
        MessageKind::MethodReturn { .. } => CallOutcome::Return(message.to_owned()),
        MessageKind::Error { error_name, .. } => {
            let mut body = message.body();

            let text = if body.signature().as_bytes().first() == Some(&b's') {
                body.load::<&str>().unwrap_or_default()
            } else {
                ""
            };

            CallOutcome::Error(Error::dbus(error_name, text))
        }
        _ => CallOutcome::Unexpected,
    }
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroU32;

    use crate::{BodyBuf, Message, MessageKind, ObjectPath, Serial};

    use super::{outcome_of, reply_serial_of, CallOutcome};

    const PATH: &ObjectPath = ObjectPath::new_const(b"/org/freedesktop/DBus");

    fn serial(n: u32) -> Serial {
        Serial::new(NonZeroU32::new(n).unwrap())
    }

    #[test]
    fn reply_serial_of_matches_returns_and_errors() {
        let call = Message::method_call(PATH, "Hello", serial(1));
        let ret = call.method_return(serial(2));
        let err = call.error("org.freedesktop.DBus.Error.Failed", serial(3));
        let signal = Message::signal(PATH, "NameOwnerChanged", serial(4));

        assert_eq!(reply_serial_of(&ret), Some(serial(1)));
        assert_eq!(reply_serial_of(&err), Some(serial(1)));
        assert_eq!(reply_serial_of(&call), None);
        assert_eq!(reply_serial_of(&signal), None);
    }

    #[test]
    fn outcome_of_return_carries_the_reply() {
        let call = Message::method_call(PATH, "Hello", serial(1));
        let ret = call.method_return(serial(2));

        assert!(matches!(outcome_of(&ret), CallOutcome::Return(_)));
    }

    #[test]
    fn outcome_of_error_extracts_the_message_string() {
        let call = Message::method_call(PATH, "Hello", serial(1));

        let mut body = BodyBuf::new();
        body.store("no such object").unwrap();

        let err = call
            .error("org.freedesktop.DBus.Error.UnknownObject", serial(2))
            .with_body(&body);

        match outcome_of(&err) {
            CallOutcome::Error(error) => {
                let (name, text) = error.as_dbus_error().expect("a dbus error");
                assert_eq!(name, "org.freedesktop.DBus.Error.UnknownObject");
                assert_eq!(text, "no such object");
            }
            _ => panic!("expected an error outcome"),
        }
    }

    #[test]
    fn outcome_of_signal_is_unexpected() {
        let signal = Message::signal(PATH, "NameOwnerChanged", serial(1));
        assert!(matches!(outcome_of(&signal), CallOutcome::Unexpected));
    }
}
