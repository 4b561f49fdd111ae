//! Threaded posting: composing a batch of messages into numbered posts,
//! resolving image attachments from their links, and publishing them as a
//! reply chain.

mod attachment;
mod composer;
mod session;


pub use attachment::{
    filename_from_url, find_link, is_image_link, Attachment, AttachmentResolver, IMAGE_SUFFIXES,
};
pub use composer::{compose, ComposeOptions, ComposedPost};
pub use session::{PublishedPost, SessionState, ThreadSession};
