//! Signature domain - the material a webhook signature is checked against

mod request;

pub use request::SignedRequest;
