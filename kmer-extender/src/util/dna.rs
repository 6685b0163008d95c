use crate::error::{KmerError, Result};

/// 字母表大小：A, C, G, T 以及未定义占位符 N
pub const SIGMA: usize = 5;

/// N 的编码，同时也是窗口越界位置的填充值
pub const UNDEFINED_CODE: u8 = 0x0;

/// 单个碱基符号。编码为 one-hot 风格的 4 bit：A=0x8, C=0x4, G=0x2, T=0x1, N=0x0。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base {
    A,
    C,
    G,
    T,
    /// 未定义 / 越界占位
    N,
}

impl Base {
    pub const ALL: [Base; SIGMA] = [Base::A, Base::C, Base::G, Base::T, Base::N];

    #[inline]
    pub fn to_code(self) -> u8 {
        match self {
            Base::A => 0x8,
            Base::C => 0x4,
            Base::G => 0x2,
            Base::T => 0x1,
            Base::N => UNDEFINED_CODE,
        }
    }

    #[inline]
    pub fn from_code(code: u8) -> Option<Base> {
        match code {
            0x8 => Some(Base::A),
            0x4 => Some(Base::C),
            0x2 => Some(Base::G),
            0x1 => Some(Base::T),
            UNDEFINED_CODE => Some(Base::N),
            _ => None,
        }
    }

    /// 只接受大写 ACGTN，不做任何大小写或 IUPAC 归一化。
    #[inline]
    pub fn from_ascii(b: u8) -> Option<Base> {
        match b {
            b'A' => Some(Base::A),
            b'C' => Some(Base::C),
            b'G' => Some(Base::G),
            b'T' => Some(Base::T),
            b'N' => Some(Base::N),
            _ => None,
        }
    }

    #[inline]
    pub fn as_ascii(self) -> u8 {
        match self {
            Base::A => b'A',
            Base::C => b'C',
            Base::G => b'G',
            Base::T => b'T',
            Base::N => b'N',
        }
    }
}

/// 将碱基序列编码为数值数组，长度与输入一致。
/// 遇到第一个非法字符即返回 `InvalidSymbol`，不返回部分结果。
pub fn encode_seq(seq: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(seq.len());
    for (pos, &b) in seq.iter().enumerate() {
        let base = Base::from_ascii(b).ok_or(KmerError::InvalidSymbol { symbol: b, pos })?;
        out.push(base.to_code());
    }
    tracing::trace!(len = out.len(), "encoded sequence");
    Ok(out)
}

/// `encode_seq` 的逆运算。
pub fn decode_seq(codes: &[u8]) -> Result<String> {
    let mut out = String::with_capacity(codes.len());
    for (pos, &code) in codes.iter().enumerate() {
        let base = Base::from_code(code).ok_or(KmerError::InvalidCode { code, pos })?;
        out.push(char::from(base.as_ascii()));
    }
    tracing::trace!(len = out.len(), "decoded sequence");
    Ok(out)
}
