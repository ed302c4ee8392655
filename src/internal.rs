//! 内部实现模块划分：`entrance` 为入口函数，`progress` 为进度领域模块。

pub mod entrance;
pub mod progress;
