use thiserror::Error;

/// 编码、解码与窗口抽取的错误类型。
///
/// 所有错误都在调用开始时或首个非法元素处立即返回，不产生部分结果。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KmerError {
    /// 序列中出现了字母表 {A,C,G,T,N} 之外的字符
    #[error("invalid symbol '{}' (0x{symbol:02x}) at position {pos}", escape(.symbol))]
    InvalidSymbol { symbol: u8, pos: usize },

    /// 编码数组中出现了未定义的编码值
    #[error("invalid code 0x{code:02x} at position {pos}")]
    InvalidCode { code: u8, pos: usize },

    /// frag_len 为 0 或小于 kmer_len
    #[error("invalid configuration: frag_len={frag_len} must be > 0 and >= kmer_len={kmer_len}")]
    InvalidConfiguration { frag_len: usize, kmer_len: usize },

    /// 并行抽取的线程池创建失败
    #[error("cannot build worker pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, KmerError>;

fn escape(b: &u8) -> String {
    std::ascii::escape_default(*b).to_string()
}
