pub mod fcm_sender;

pub use fcm_sender::FcmSender;
