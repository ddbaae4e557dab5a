pub mod notification_dto;
pub mod notification_handlers;
pub mod notification_models;
pub mod notification_repository;
pub mod notification_service;

pub use notification_dto::{
    BroadcastNotificationRequest, BroadcastNotificationResponse, MarkReadResponse,
    NotificationListResponse, SendNotificationRequest, SendNotificationResponse,
};
pub use notification_handlers::{
    broadcast_notification, get_notifications, mark_notification_read, send_notification,
};
pub use notification_models::{NewNotification, Notification};
pub use notification_repository::{NotificationRepository, PgNotificationRepository};
pub use notification_service::NotificationService;
