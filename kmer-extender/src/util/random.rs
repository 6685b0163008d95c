use rand::seq::index;
use rand::Rng;

const BASES: [u8; 4] = [b'C', b'T', b'A', b'G'];

/// 生成长度为 `len` 的随机序列，四种碱基等概率。
pub fn random_sequence<R: Rng>(len: usize, rng: &mut R) -> Vec<u8> {
    (0..len).map(|_| BASES[rng.gen_range(0..BASES.len())]).collect()
}

/// 在 `[0, seq_len - kmer_len]` 中无放回抽取 `count` 个锚点。
/// 可选位置不足时返回全部位置（顺序随机）；`seq_len < kmer_len` 时返回空。
pub fn random_anchors<R: Rng>(seq_len: usize, kmer_len: usize, count: usize, rng: &mut R) -> Vec<i64> {
    if seq_len < kmer_len {
        return Vec::new();
    }
    let range = seq_len - kmer_len + 1;
    let amount = count.min(range);
    index::sample(rng, range, amount).into_iter().map(|i| i as i64).collect()
}
