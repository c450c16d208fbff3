//! End-to-end exercises of the public API, using only what a downstream
//! crate can see.

use errlink::{Code, CodedError, Error, WrapExt};

const BAD_REQUEST: Code = Code(400);
const INTERNAL: Code = Code(500);
const UNKNOWN: Code = Code(-1);
const OK: Code = Code(0);

fn load_user(id: u64) -> errlink::Result<String> {
    let lookup: Result<String, std::io::Error> = Err(std::io::Error::new(
        std::io::ErrorKind::TimedOut,
        "db timeout",
    ));
    lookup.wrap_with(|| format!("query failed for user {id}"))
}

#[test]
fn request_pipeline_renders_and_classifies() {
    let err = load_user(7)
        .map_err(|e| INTERNAL.wrap(e, "request failed"))
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "code(500), request failed, query failed for user 7, db timeout"
    );
    assert_eq!(err.nearest_code(), 500);
    assert_eq!(err.root_code(), 0);
    assert!(err.root_cause().downcast_ref::<std::io::Error>().is_some());

    err.set_tag("user_id", "7");
    assert_eq!(err.get_tag("user_id"), vec!["7"]);
}

#[test]
fn dump_at_the_service_boundary() {
    let err = BAD_REQUEST.err("symbol cannot be empty");
    let (code, msg) = Code::dump(OK, UNKNOWN, Some(&err), "validate order");
    assert_eq!(code, BAD_REQUEST);
    assert_eq!(msg, "validate order, symbol cannot be empty");

    let (code, msg) = Code::dump(OK, UNKNOWN, None, "validate order");
    assert_eq!(code, OK);
    assert_eq!(msg, "");
}

#[test]
fn foreign_errors_participate_in_code_extraction() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err = Error::wrap(CodedError::new(403, io), "upload rejected");

    assert_eq!(err.nearest_code(), 403);
    assert_eq!(err.root_code(), 403);

    let mut codes = Vec::new();
    err.traverse_code(|_, code| {
        codes.push(code);
        Ok(())
    })
    .unwrap();
    assert_eq!(codes, vec![0, 403, 0]);
}

#[test]
fn traversal_survives_a_panicking_visitor() {
    let err = Error::wrap(Error::new("inner"), "outer");
    let returned = err
        .traverse_to_root(|_| panic!("visitor bug"))
        .unwrap_err();
    assert!(errlink::is_untyped_execution_failure(&*returned));
    assert!(returned.to_string().contains("visitor bug"));
}
