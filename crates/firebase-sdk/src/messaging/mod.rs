mod client;

pub use client::MessagingClient;
