//! 演示如何在 library 模式下使用 kmer-extender 抽取窗口。
//!
//! 运行方式：
//! ```bash
//! cargo run --example simple_extend
//! ```

use kmer_extender::extend::{format, ExtendOpt, WindowBatch};
use kmer_extender::util::dna;

fn main() -> kmer_extender::Result<()> {
    // 1. 参考序列编码
    let reference = b"AAAGTGTTTCTGACTAATGCTGGAAAGAATAT";
    let memory = dna::encode_seq(reference)?;
    println!("参考序列: {}", String::from_utf8_lossy(reference));
    println!("编码: {}", format::format_codes(&memory));

    // 2. 围绕锚点抽取窗口，offset = (8 - 4) / 2 = 2
    let anchors = [0, 5, 15, 21, 28];
    let opt = ExtendOpt::new(8, 4);
    let batch = WindowBatch::extract(&anchors, opt, &memory)?;
    println!("\n锚点 {:?}，frag_len={}，kmer_len={}，offset={}", anchors, batch.frag_len, batch.kmer_len, batch.offset);

    // 3. 逐行解码
    for (idx, row) in anchors.iter().zip(batch.decode_rows()?) {
        println!("  anchor={:>3}  {}", idx, row);
    }

    // 4. 越界锚点同样返回定长窗口
    let edge = WindowBatch::extract(&[-6, 40], opt, &memory)?;
    println!("\n越界锚点:\n{}", format::format_batch(&edge.windows)?);

    // 5. 非法配置
    if let Err(e) = WindowBatch::extract(&anchors, ExtendOpt::new(2, 4), &memory) {
        println!("\n错误示例: {}", e);
    }

    println!("\n完成！");
    Ok(())
}
