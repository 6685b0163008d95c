use std::fmt::Write as _;

use crate::error::Result;
use crate::util::dna;

/// 将一批窗口渲染为文本：每行解码后加方括号，行间以换行分隔，整体再包一层方括号。
///
/// 例：`[[NNAAAGTG]\n[GTGTTTCT]]`；空批次渲染为 `[]`。
pub fn format_batch(windows: &[Vec<u8>]) -> Result<String> {
    let mut out = String::with_capacity(windows.len() * (windows.first().map_or(0, Vec::len) + 3) + 2);
    out.push('[');
    for (i, w) in windows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push('[');
        out.push_str(&dna::decode_seq(w)?);
        out.push(']');
    }
    out.push(']');
    Ok(out)
}

/// 以十六进制列出编码数组，如 `[8 8 8 2 1]`
pub fn format_codes(codes: &[u8]) -> String {
    let mut out = String::with_capacity(codes.len() * 2 + 2);
    out.push('[');
    for (i, c) in codes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:x}", c);
    }
    out.push(']');
    out
}
