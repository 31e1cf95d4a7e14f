//! Integration tests: end-to-end flows across modules.

mod api_flow;
mod carousel_flow;
mod scripted_chat;
