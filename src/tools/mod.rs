//! 工具箱：四个协作服务能力（create_order / charge_payment / adjust_inventory / send_notification）
//! 与注册表、执行器、协作服务客户端

pub mod backend;
pub mod executor;
pub mod inventory;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod registry;
pub mod schema;

pub use backend::{parse_endpoint, BackendClient};
pub use executor::ToolExecutor;
pub use inventory::AdjustInventoryTool;
pub use notifications::SendNotificationTool;
pub use orders::{CreateOrderTool, OrderItem};
pub use payments::ChargePaymentTool;
pub use registry::{Tool, ToolDescriptor, ToolRegistry};
