//! 进度领域模块：后台聚合任务 + 两个透明流装饰器。
//!
//! 使用方式：`wrap_reader(cancel, reader, total, ticks)` 得到装饰后的流与快照流，
//! 读写照常进行，快照由消费方按自己的节奏拉取。
//! 对外导出以 [`crate::progress`] 为准，此处仅做模块划分，不重复 pub use。

pub mod structs;
pub mod traits;
