//! Compiled match rules used to subscribe to and filter signals.

use core::fmt;

#[cfg(feature = "alloc")]
use alloc::string::String;

use crate::{Message, ObjectPath};

/// The message type a [`MatchRule`] should match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum MatchType {
    /// Match method calls.
    MethodCall,
    /// Match method returns.
    MethodReturn,
    /// Match errors.
    Error,
    /// Match signals.
    Signal,
}

impl MatchType {
    fn as_str(self) -> &'static str {
        match self {
            MatchType::MethodCall => "method_call",
            MatchType::MethodReturn => "method_return",
            MatchType::Error => "error",
            MatchType::Signal => "signal",
        }
    }
}

/// A builder for a signal match rule, as subscribed server-side through
/// `org.freedesktop.DBus.AddMatch`.
///
/// # Examples
///
/// ```
/// use dbus_wire::MatchRule;
///
/// let rule = MatchRule::new()
///     .signal()
///     .interface("org.freedesktop.DBus")
///     .member("NameOwnerChanged");
///
/// assert_eq!(
///     rule.to_rule_string(),
///     "type='signal',interface='org.freedesktop.DBus',member='NameOwnerChanged'"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchRule {
    message_type: Option<MatchType>,
    sender: Option<String>,
    interface: Option<String>,
    member: Option<String>,
    path: Option<String>,
    path_namespace: Option<String>,
    destination: Option<String>,
    arg0: Option<String>,
    arg0_path: Option<String>,
    arg0_namespace: Option<String>,
}

impl MatchRule {
    /// Construct a new, empty match rule which matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Match only method calls.
    pub fn method_call(mut self) -> Self {
        self.message_type = Some(MatchType::MethodCall);
        self
    }

    /// Match only method returns.
    pub fn method_return(mut self) -> Self {
        self.message_type = Some(MatchType::MethodReturn);
        self
    }

    /// Match only errors.
    pub fn error(mut self) -> Self {
        self.message_type = Some(MatchType::Error);
        self
    }

    /// Match only signals.
    pub fn signal(mut self) -> Self {
        self.message_type = Some(MatchType::Signal);
        self
    }

    /// Match messages from the given sender.
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Match messages on the given interface.
    pub fn interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    /// Match messages with the given member.
    pub fn member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }

    /// Match messages sent to the given path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Match messages sent to the given path, or any path below it.
    pub fn path_namespace(mut self, path: impl Into<String>) -> Self {
        self.path_namespace = Some(path.into());
        self
    }

    /// Match messages sent to the given destination.
    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Match messages whose first argument is the given string.
    pub fn arg0(mut self, arg0: impl Into<String>) -> Self {
        self.arg0 = Some(arg0.into());
        self
    }

    /// Match messages whose first argument is an object path equal to, or
    /// (when ending in `/`) a namespace-prefix of, the given path.
    pub fn arg0_path(mut self, arg0_path: impl Into<String>) -> Self {
        self.arg0_path = Some(arg0_path.into());
        self
    }

    /// Match messages whose first argument is a string equal to, or a
    /// `.`-namespace-prefix of, the given name.
    pub fn arg0_namespace(mut self, arg0_namespace: impl Into<String>) -> Self {
        self.arg0_namespace = Some(arg0_namespace.into());
        self
    }

    /// Render the canonical server-side rule string, as sent to
    /// `AddMatch`/`RemoveMatch`.
    pub fn to_rule_string(&self) -> String {
        let mut out = String::new();

        macro_rules! push {
            ($key:expr, $value:expr) => {
                if !out.is_empty() {
                    out.push(',');
                }

                out.push_str($key);
                out.push('=');
                out.push('\'');
                push_escaped(&mut out, $value);
                out.push('\'');
            };
        }

        if let Some(message_type) = self.message_type {
            push!("type", message_type.as_str());
        }

        if let Some(sender) = &self.sender {
            push!("sender", sender);
        }

        if let Some(interface) = &self.interface {
            push!("interface", interface);
        }

        if let Some(member) = &self.member {
            push!("member", member);
        }

        if let Some(path) = &self.path {
            push!("path", path);
        }

        if let Some(path_namespace) = &self.path_namespace {
            push!("path_namespace", path_namespace);
        }

        if let Some(destination) = &self.destination {
            push!("destination", destination);
        }

        if let Some(arg0) = &self.arg0 {
            push!("arg0", arg0);
        }

        if let Some(arg0_path) = &self.arg0_path {
            push!("arg0path", arg0_path);
        }

        if let Some(arg0_namespace) = &self.arg0_namespace {
            push!("arg0namespace", arg0_namespace);
        }

        out
    }

    /// Test if this rule matches the given message.
    ///
    /// Only well-formed messages are matched against; a malformed arg0 (for
    /// example a body whose first argument isn't a string or object path
    /// when an arg0-form is in use) simply fails to match rather than
    /// erroring.
    pub fn matches(&self, message: &Message<'_>) -> bool {
        if let Some(message_type) = self.message_type {
            if message_type_of(message) != message_type {
                return false;
            }
        }

        if let Some(sender) = &self.sender {
            if message.sender() != Some(sender.as_str()) {
                return false;
            }
        }

        if let Some(interface) = &self.interface {
            if message.interface() != Some(interface.as_str()) {
                return false;
            }
        }

        if let Some(member) = &self.member {
            if message_member(message) != Some(member.as_str()) {
                return false;
            }
        }

        if let Some(path) = &self.path {
            if message_path(message).map(ObjectPath::as_str) != Some(path.as_str()) {
                return false;
            }
        }

        if let Some(path_namespace) = &self.path_namespace {
            let Some(actual) = message_path(message) else {
                return false;
            };

            if !path_namespace_matches(path_namespace, actual) {
                return false;
            }
        }

        if let Some(destination) = &self.destination {
            if message.destination() != Some(destination.as_str()) {
                return false;
            }
        }

        if self.arg0.is_some() || self.arg0_path.is_some() || self.arg0_namespace.is_some() {
            let Some(first) = read_arg0(message) else {
                return false;
            };

            match first {
                Arg0::String(value) => {
                    if let Some(arg0) = &self.arg0 {
                        if value != arg0 {
                            return false;
                        }
                    }

                    if let Some(arg0_namespace) = &self.arg0_namespace {
                        if !namespace_matches(arg0_namespace, value) {
                            return false;
                        }
                    }

                    if self.arg0_path.is_some() {
                        return false;
                    }
                }
                Arg0::ObjectPath(value) => {
                    if self.arg0.is_some() || self.arg0_namespace.is_some() {
                        return false;
                    }

                    if let Some(arg0_path) = &self.arg0_path {
                        if !arg0_path_matches(arg0_path, value) {
                            return false;
                        }
                    }
                }
            }
        }

        true
    }
}

impl fmt::Display for MatchRule {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rule_string())
    }
}

fn push_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        if c == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(c);
        }
    }
}

enum Arg0<'a> {
    String(&'a str),
    ObjectPath(&'a ObjectPath),
}

fn read_arg0<'a>(message: &Message<'a>) -> Option<Arg0<'a>> {
    let mut body = message.body();
    let signature = body.signature().as_bytes();

    match signature.first()? {
        b's' => Some(Arg0::String(body.load::<&str>().ok()?)),
        b'o' => Some(Arg0::ObjectPath(body.load::<&ObjectPath>().ok()?)),
        _ => None,
    }
}

fn path_namespace_matches(namespace: &str, path: &ObjectPath) -> bool {
    if let Ok(namespace) = ObjectPath::new(namespace) {
        namespace.as_str() == path.as_str() || namespace.is_namespace_of(path)
    } else {
        false
    }
}

fn arg0_path_matches(rule: &str, value: &ObjectPath) -> bool {
    let value = value.as_str();

    if rule == value {
        return true;
    }

    if rule.ends_with('/') && value.starts_with(rule) {
        return true;
    }

    if value.ends_with('/') && rule.starts_with(value) {
        return true;
    }

    false
}

fn namespace_matches(namespace: &str, name: &str) -> bool {
    if namespace == name {
        return true;
    }

    if let Some(rest) = name.strip_prefix(namespace) {
        return rest.starts_with('.');
    }

    false
}

fn message_type_of(message: &Message<'_>) -> MatchType {
    use crate::MessageKind;

    match message.kind() {
        MessageKind::MethodCall { .. } => MatchType::MethodCall,
        MessageKind::MethodReturn { .. } => MatchType::MethodReturn,
        MessageKind::Error { .. } => MatchType::Error,
        MessageKind::Signal { .. } => MatchType::Signal,
    }
}

fn message_member<'a>(message: &Message<'a>) -> Option<&'a str> {
    use crate::MessageKind;

    match message.kind() {
        MessageKind::MethodCall { member, .. } => Some(member),
        MessageKind::Signal { member, .. } => Some(member),
        _ => None,
    }
}

fn message_path<'a>(message: &Message<'a>) -> Option<&'a ObjectPath> {
    use crate::MessageKind;

    match message.kind() {
        MessageKind::MethodCall { path, .. } => Some(path),
        MessageKind::Signal { path, .. } => Some(path),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_string() {
        let rule = MatchRule::new()
            .signal()
            .interface("org.freedesktop.DBus")
            .member("NameOwnerChanged");

        assert_eq!(
            rule.to_rule_string(),
            "type='signal',interface='org.freedesktop.DBus',member='NameOwnerChanged'"
        );
    }

    #[test]
    fn test_path_namespace() {
        let base = ObjectPath::new("/a/b").unwrap();
        assert!(path_namespace_matches("/a/b", ObjectPath::new("/a/b").unwrap()));
        assert!(path_namespace_matches("/a/b", ObjectPath::new("/a/b/c").unwrap()));
        assert!(path_namespace_matches("/a/b", ObjectPath::new("/a/b/c/d").unwrap()));
        assert!(!path_namespace_matches("/a/b", ObjectPath::new("/a/bc").unwrap()));
        assert!(!path_namespace_matches("/a/b", ObjectPath::new("/a").unwrap()));
        let _ = base;
    }

    #[test]
    fn test_arg0_namespace() {
        assert!(namespace_matches("com.x", "com.x"));
        assert!(namespace_matches("com.x", "com.x.y"));
        assert!(!namespace_matches("com.x", "com.xy"));
    }

    #[test]
    fn test_arg0_path() {
        assert!(arg0_path_matches(
            "/a/b/",
            ObjectPath::new("/a/b/").unwrap()
        ));
        assert!(arg0_path_matches(
            "/a/b/",
            ObjectPath::new("/a/b/c").unwrap()
        ));
        assert!(!arg0_path_matches("/a/b/", ObjectPath::new("/a/b").unwrap()));
    }
}
