//! 入口函数：为一条流绑定一个聚合任务并启动，返回装饰后的流与快照流。

pub mod reader;
pub mod writer;
