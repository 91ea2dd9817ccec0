mod notification;

pub use notification::{
    CallNotification, MailNotification, Notification, NotificationKind, NotificationRequest,
    NotificationType, SmsNotification, WireError,
};
