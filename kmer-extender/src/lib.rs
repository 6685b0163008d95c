//! # kmer-extender
//!
//! 将核苷酸序列编码为定宽 one-hot 编码，并围绕任意锚点抽取定长窗口（extended k-mer）。
//!
//! - **编码 / 解码**：A=0x8, C=0x4, G=0x2, T=0x1, N=0x0，双向精确可逆
//! - **窗口抽取**：以 `(frag_len - kmer_len) / 2` 为偏移居中，越界位置以 N 填充
//! - **批量渲染**：将窗口矩阵逐行解码为文本
//!
//! ## 快速示例
//!
//! ```rust
//! use kmer_extender::extend::{self, ExtendOpt};
//! use kmer_extender::util::dna;
//!
//! let memory = dna::encode_seq(b"AAAGTGTTTCTGACTAATGCTGGAAAGAATAT").unwrap();
//! let windows = extend::extend_kmers(&[0, 28], ExtendOpt::new(8, 4), &memory).unwrap();
//! assert_eq!(dna::decode_seq(&windows[0]).unwrap(), "NNAAAGTG");
//! assert_eq!(dna::decode_seq(&windows[1]).unwrap(), "GAATATNN");
//! ```
//!
//! ## 模块说明
//!
//! - [`util`] — 碱基编码 / 解码、随机序列与锚点生成
//! - [`extend`] — 窗口抽取与批量渲染
//! - [`io`] — FASTA 参考序列读取
//! - [`error`] — 错误类型

pub mod error;
pub mod extend;
pub mod io;
pub mod util;

pub use error::{KmerError, Result};
