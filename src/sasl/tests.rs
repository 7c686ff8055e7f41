use super::{parse_response, Auth, SaslRequest, SaslResponse};

#[test]
fn test_external_from_uid() {
    assert_eq!(
        Auth::external_from_u32_ascii_hex(&mut [0; 32], 1000),
        Auth::External(b"31303030")
    );
    assert_eq!(
        Auth::external_from_u32_ascii_hex(&mut [0; 32], u32::MAX),
        Auth::External(b"34323934393637323935")
    );
    assert_eq!(
        Auth::external_from_u32_ascii_hex(&mut [0; 32], 0),
        Auth::External(b"00")
    );
}

#[test]
fn test_parse_ok() {
    let response = parse_response(b"OK 1234deadbeef\r\n").unwrap();
    assert!(matches!(response, SaslResponse::Ok(guid) if guid.as_bytes() == b"1234deadbeef"));
}

#[test]
fn test_parse_rejected() {
    assert!(matches!(
        parse_response(b"REJECTED EXTERNAL ANONYMOUS\r\n").unwrap(),
        SaslResponse::Rejected
    ));
    assert!(matches!(
        parse_response(b"REJECTED\r\n").unwrap(),
        SaslResponse::Rejected
    ));
}

#[test]
fn test_parse_agree_unix_fd() {
    assert!(matches!(
        parse_response(b"AGREE_UNIX_FD\r\n").unwrap(),
        SaslResponse::AgreeUnixFd
    ));
}

#[test]
fn test_parse_invalid() {
    assert!(parse_response(b"GARBAGE\r\n").is_err());
}

#[test]
fn test_write_command_external() {
    let mut out = Vec::new();
    SaslRequest::Auth(Auth::External(b"31303030")).write_command(&mut out);
    assert_eq!(out, b"AUTH EXTERNAL 31303030\r\n");
}

#[test]
fn test_write_command_anonymous() {
    let mut out = Vec::new();
    SaslRequest::Auth(Auth::Anonymous).write_command(&mut out);
    assert_eq!(out, b"AUTH ANONYMOUS\r\n");
}

#[test]
fn test_write_command_negotiate_and_begin() {
    let mut out = Vec::new();
    SaslRequest::NegotiateUnixFd.write_command(&mut out);
    assert_eq!(out, b"NEGOTIATE_UNIX_FD\r\n");

    out.clear();
    SaslRequest::Begin.write_command(&mut out);
    assert_eq!(out, b"BEGIN\r\n");
}
