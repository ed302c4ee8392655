/// 内部导出的模块
mod internal;


/// 导出核心入口函数
pub use internal::entrance::reader::*;
pub use internal::entrance::writer::*;

/// 对外提供进度领域类型；入口函数已在根部导出，此处供需要显式类型标注的调用方使用
pub mod progress {
    use crate::internal;
    pub use internal::progress::structs::progress_error::ProgressError;
    pub use internal::progress::structs::progress_reader::ProgressReader;
    pub use internal::progress::structs::progress_writer::ProgressWriter;
    pub use internal::progress::structs::snapshot::Snapshot;
    pub use internal::progress::structs::snapshot_stream::SnapshotStream;

    pub mod traits {
        pub use crate::internal::progress::traits::tick_source::TickSource;
    }
}
