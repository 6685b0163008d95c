use rayon::prelude::*;
use serde::Serialize;

use crate::error::{KmerError, Result};
use crate::util::dna::{self, UNDEFINED_CODE};

pub mod format;

/// 窗口抽取参数
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtendOpt {
    /// 输出窗口长度
    pub frag_len: usize,
    /// 锚点 k-mer 长度，仅用于计算居中偏移
    pub kmer_len: usize,
    /// 并行线程数；<= 1 时顺序执行
    pub threads: usize,
}

impl Default for ExtendOpt {
    fn default() -> Self {
        Self { frag_len: 8, kmer_len: 4, threads: 1 }
    }
}

impl ExtendOpt {
    pub fn new(frag_len: usize, kmer_len: usize) -> Self {
        Self { frag_len, kmer_len, threads: 1 }
    }

    /// frag_len 须在 `[max(1, kmer_len), i64::MAX]` 内，窗口坐标以 i64 计算。
    pub fn validate(&self) -> Result<()> {
        if self.frag_len == 0 || self.frag_len < self.kmer_len || self.frag_len > i64::MAX as usize {
            return Err(KmerError::InvalidConfiguration {
                frag_len: self.frag_len,
                kmer_len: self.kmer_len,
            });
        }
        Ok(())
    }

    /// 锚点自身编码在窗口中的下标：(frag_len - kmer_len) / 2
    #[inline]
    pub fn offset(&self) -> usize {
        self.frag_len.saturating_sub(self.kmer_len) / 2
    }
}

/// 一次抽取的结果：窗口顺序与锚点顺序一一对应
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowBatch {
    pub frag_len: usize,
    pub kmer_len: usize,
    pub offset: usize,
    pub anchors: Vec<i64>,
    pub windows: Vec<Vec<u8>>,
}

impl WindowBatch {
    /// 校验参数并抽取全部窗口；`opt.threads > 1` 时走并行路径。
    pub fn extract(anchors: &[i64], opt: ExtendOpt, memory: &[u8]) -> Result<Self> {
        let windows = extend_kmers_par(anchors, opt, memory)?;
        Ok(Self {
            frag_len: opt.frag_len,
            kmer_len: opt.kmer_len,
            offset: opt.offset(),
            anchors: anchors.to_vec(),
            windows,
        })
    }

    /// 逐行解码为 ACGTN 文本
    pub fn decode_rows(&self) -> Result<Vec<String>> {
        self.windows.iter().map(|w| dna::decode_seq(w)).collect()
    }
}

/// 抽取单个锚点的窗口。
///
/// 窗口起点 `start = idx - offset`；落在 `[0, memory.len())` 之外的位置填 N。
pub fn extend_one(idx: i64, opt: ExtendOpt, memory: &[u8]) -> Result<Vec<u8>> {
    opt.validate()?;
    Ok(window_at(idx, opt, memory))
}

// opt 必须已通过 validate
fn window_at(idx: i64, opt: ExtendOpt, memory: &[u8]) -> Vec<u8> {
    let mut window = vec![UNDEFINED_CODE; opt.frag_len];
    let n = memory.len() as i64;
    let start = idx.saturating_sub(opt.offset() as i64);
    let end = start.saturating_add(opt.frag_len as i64);

    // 与 memory 的交集 [lo, hi)，可能为空
    let lo = start.clamp(0, n);
    let hi = end.clamp(0, n);
    if lo < hi {
        let dst = (lo - start) as usize;
        let len = (hi - lo) as usize;
        window[dst..dst + len].copy_from_slice(&memory[lo as usize..hi as usize]);
    }
    window
}

/// 对每个锚点抽取定长窗口（extended k-mer），输出顺序与 `anchors` 一致。
pub fn extend_kmers(anchors: &[i64], opt: ExtendOpt, memory: &[u8]) -> Result<Vec<Vec<u8>>> {
    opt.validate()?;
    tracing::debug!(
        anchors = anchors.len(),
        frag_len = opt.frag_len,
        kmer_len = opt.kmer_len,
        offset = opt.offset(),
        memory_len = memory.len(),
        "extending k-mers"
    );
    Ok(anchors.iter().map(|&idx| window_at(idx, opt, memory)).collect())
}

/// `extend_kmers` 的并行版本，结果完全一致。
///
/// 在一个大小为 `opt.threads` 的独立 rayon 线程池中执行；`threads <= 1` 时退化为顺序抽取。
/// `memory` 在整个批次内只读共享。
pub fn extend_kmers_par(anchors: &[i64], opt: ExtendOpt, memory: &[u8]) -> Result<Vec<Vec<u8>>> {
    if opt.threads <= 1 {
        return extend_kmers(anchors, opt, memory);
    }
    opt.validate()?;
    tracing::debug!(
        anchors = anchors.len(),
        frag_len = opt.frag_len,
        kmer_len = opt.kmer_len,
        threads = opt.threads,
        "extending k-mers in parallel"
    );
    in_pool(opt.threads, || anchors.par_iter().map(|&idx| window_at(idx, opt, memory)).collect())
}

fn in_pool<T, F>(threads: usize, f: F) -> Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| KmerError::ThreadPool(e.to_string()))?;
    Ok(pool.install(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::dna::{encode_seq, Base};
    use proptest::prelude::*;

    const MEMORY: &[u8] = b"AAAGTGTTTCTGACTAATGCTGGAAAGAATAT";

    fn code(b: u8) -> u8 {
        Base::from_ascii(b).unwrap().to_code()
    }

    #[test]
    fn offset_is_floor_half_of_extension() {
        assert_eq!(ExtendOpt::new(8, 4).offset(), 2);
        assert_eq!(ExtendOpt::new(9, 4).offset(), 2);
        assert_eq!(ExtendOpt::new(4, 4).offset(), 0);
        assert_eq!(ExtendOpt::new(5, 0).offset(), 2);
    }

    #[test]
    fn rejects_invalid_configuration() {
        let mem = encode_seq(MEMORY).unwrap();
        assert_eq!(
            extend_kmers(&[0], ExtendOpt::new(2, 4), &mem).unwrap_err(),
            KmerError::InvalidConfiguration { frag_len: 2, kmer_len: 4 }
        );
        assert_eq!(
            extend_kmers(&[], ExtendOpt::new(0, 0), &mem).unwrap_err(),
            KmerError::InvalidConfiguration { frag_len: 0, kmer_len: 0 }
        );
        assert!(extend_kmers_par(&[0], ExtendOpt::new(3, 5), &mem).is_err());
        assert!(ExtendOpt::new(1, 0).validate().is_ok());
    }

    #[test]
    fn single_window_validates_configuration() {
        let mem = encode_seq(MEMORY).unwrap();
        assert_eq!(
            extend_one(0, ExtendOpt::new(2, 4), &mem).unwrap_err(),
            KmerError::InvalidConfiguration { frag_len: 2, kmer_len: 4 }
        );
        assert_eq!(extend_one(0, ExtendOpt::new(8, 4), &mem).unwrap(), vec![0, 0, 8, 8, 8, 2, 1, 2]);
    }

    #[test]
    fn frag_len_beyond_i64_is_rejected() {
        let opt = ExtendOpt::new(usize::MAX, 0);
        assert_eq!(
            opt.validate().unwrap_err(),
            KmerError::InvalidConfiguration { frag_len: usize::MAX, kmer_len: 0 }
        );
        assert!(extend_kmers(&[0], opt, &[]).is_err());
        assert!(ExtendOpt::new(i64::MAX as usize, 0).validate().is_ok());
    }

    #[test]
    fn parallel_uses_requested_thread_count() {
        // 外层池大小与请求不同，确认 in_pool 不继承外层池
        let outer = rayon::ThreadPoolBuilder::new().num_threads(7).build().unwrap();
        let seen = outer.install(|| in_pool(2, rayon::current_num_threads)).unwrap();
        assert_eq!(seen, 2);

        let mem = encode_seq(MEMORY).unwrap();
        let opt = ExtendOpt { frag_len: 8, kmer_len: 4, threads: 2 };
        let par = outer.install(|| extend_kmers_par(&[0, 28], opt, &mem)).unwrap();
        assert_eq!(par, extend_kmers(&[0, 28], opt, &mem).unwrap());
    }

    #[test]
    fn parallel_with_one_thread_is_sequential() {
        let mem = encode_seq(MEMORY).unwrap();
        let opt = ExtendOpt { frag_len: 8, kmer_len: 4, threads: 0 };
        assert_eq!(
            extend_kmers_par(&[5, 15], opt, &mem).unwrap(),
            extend_kmers(&[5, 15], opt, &mem).unwrap()
        );
        assert!(extend_kmers_par(&[0], ExtendOpt { frag_len: 2, kmer_len: 4, threads: 1 }, &mem).is_err());
    }

    #[test]
    fn left_edge_is_padded() {
        let mem = encode_seq(MEMORY).unwrap();
        let w = extend_kmers(&[0], ExtendOpt::new(8, 4), &mem).unwrap();
        let expected: Vec<u8> = vec![0, 0, code(b'A'), code(b'A'), code(b'A'), code(b'G'), code(b'T'), code(b'G')];
        assert_eq!(w, vec![expected]);
    }

    #[test]
    fn right_edge_is_padded() {
        let mem = encode_seq(MEMORY).unwrap();
        let w = extend_kmers(&[28], ExtendOpt::new(8, 4), &mem).unwrap();
        // start = 26，memory[26..32] = "GAATAT"，最后两位越界
        assert_eq!(&w[0][..6], &mem[26..32]);
        assert_eq!(&w[0][6..], &[UNDEFINED_CODE, UNDEFINED_CODE]);
    }

    #[test]
    fn driver_scenario() {
        let mem = encode_seq(MEMORY).unwrap();
        let anchors = [0, 5, 15, 21, 28];
        let batch = WindowBatch::extract(&anchors, ExtendOpt::new(8, 4), &mem).unwrap();
        assert_eq!(batch.offset, 2);
        assert_eq!(
            batch.decode_rows().unwrap(),
            vec!["NNAAAGTG", "GTGTTTCT", "CTAATGCT", "CTGGAAAG", "GAATATNN"]
        );
    }

    #[test]
    fn anchors_entirely_out_of_bounds() {
        let mem = encode_seq(b"ACGT").unwrap();
        let opt = ExtendOpt::new(6, 2);
        let w = extend_kmers(&[-100, 100, -4, 6], opt, &mem).unwrap();
        assert!(w.iter().all(|row| row == &vec![UNDEFINED_CODE; 6]));
    }

    #[test]
    fn window_larger_than_memory() {
        let mem = encode_seq(b"ACG").unwrap();
        let w = extend_kmers(&[1], ExtendOpt::new(9, 1), &mem).unwrap();
        // offset = 4, start = -3
        assert_eq!(w[0], vec![0, 0, 0, 8, 4, 2, 0, 0, 0]);
    }

    #[test]
    fn empty_inputs() {
        let mem = encode_seq(MEMORY).unwrap();
        assert!(extend_kmers(&[], ExtendOpt::new(8, 4), &mem).unwrap().is_empty());
        let batch = WindowBatch::extract(&[], ExtendOpt::new(8, 4), &mem).unwrap();
        assert!(batch.windows.is_empty());

        let w = extend_kmers(&[0, 3], ExtendOpt::new(4, 2), &[]).unwrap();
        assert_eq!(w, vec![vec![UNDEFINED_CODE; 4]; 2]);
    }

    #[test]
    fn windows_do_not_alias_memory() {
        let mem = encode_seq(MEMORY).unwrap();
        let mut w = extend_kmers(&[10, 10], ExtendOpt::new(8, 4), &mem).unwrap();
        w[0][0] = 0xff;
        assert_ne!(w[0], w[1]);
        assert_eq!(mem, encode_seq(MEMORY).unwrap());
    }

    #[test]
    fn parallel_matches_sequential() {
        let mem = encode_seq(MEMORY).unwrap();
        let anchors: Vec<i64> = (-10..45).collect();
        let opt = ExtendOpt { frag_len: 11, kmer_len: 3, threads: 4 };
        let seq = extend_kmers(&anchors, opt, &mem).unwrap();
        let par = extend_kmers_par(&anchors, opt, &mem).unwrap();
        assert_eq!(seq, par);
        let batch = WindowBatch::extract(&anchors, opt, &mem).unwrap();
        assert_eq!(batch.windows, seq);
        assert_eq!(batch.anchors, anchors);
    }

    #[test]
    fn batch_serializes_to_json() {
        let mem = encode_seq(MEMORY).unwrap();
        let batch = WindowBatch::extract(&[0], ExtendOpt::new(8, 4), &mem).unwrap();
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "frag_len": 8,
                "kmer_len": 4,
                "offset": 2,
                "anchors": [0],
                "windows": [[0, 0, 8, 8, 8, 2, 1, 2]],
            })
        );
    }

    proptest! {
        #[test]
        fn prop_window_shape_and_fill(
            seq in "[ACGT]{0,64}",
            anchors in proptest::collection::vec(-80i64..150, 0..16),
            kmer_len in 0usize..8,
            extra in 0usize..12,
        ) {
            let mem = encode_seq(seq.as_bytes()).unwrap();
            let opt = ExtendOpt::new(kmer_len + extra.max(1), kmer_len);
            let offset = opt.offset() as i64;
            let windows = extend_kmers(&anchors, opt, &mem).unwrap();
            prop_assert_eq!(windows.len(), anchors.len());

            let n = mem.len() as i64;
            for (w, &idx) in windows.iter().zip(&anchors) {
                prop_assert_eq!(w.len(), opt.frag_len);
                let start = idx - offset;
                for (j, &v) in w.iter().enumerate() {
                    let p = start + j as i64;
                    if p >= 0 && p < n {
                        prop_assert_eq!(v, mem[p as usize]);
                    } else {
                        prop_assert_eq!(v, UNDEFINED_CODE);
                    }
                }
                if idx >= 0 && idx < n {
                    prop_assert_eq!(w[offset as usize], mem[idx as usize]);
                }
            }
        }
    }
}
