//! 进度装饰器相关错误类型。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("传输已被取消")]
    Cancelled,
}

impl ProgressError {
    /// 把取消错误包装成 `io::Error`（kind 为 `Interrupted`），
    /// 调用方可通过 `io::Error::get_ref` + downcast 取回原因。
    pub(crate) fn cancelled_io() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::Interrupted, ProgressError::Cancelled)
    }
}
