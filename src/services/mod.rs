/// Claim handling and the administrative board reset.
pub mod booking_service;
/// Coalescing flush loop batching claim notifications.
pub mod broadcast_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Round orchestration: auto-start, countdown, expiry watchdog, reveal.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Participant WebSocket sessions and the distinct-presence roster.
pub mod presence_service;
/// Random reward-block generation.
pub mod reward_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Slot store connection supervision.
pub mod storage_supervisor;
