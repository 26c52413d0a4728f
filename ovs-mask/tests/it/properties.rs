use ovs_mask::{decompose, BitWidth, Cover, MaskedValue};
use rand::Rng;

const ROUNDS: usize = 2_000;

/// Reference scan: tries every block size from the largest down, without any bit tricks.
fn naive(low: u64, high: u64, width: BitWidth) -> Vec<(u64, u64)> {
    let mut out = Vec::new();
    let mut cursor = low;

    loop {
        let mut bits = width.bits();
        loop {
            let size = 1u128 << bits;
            let aligned = cursor as u128 % size == 0;
            let fits = cursor as u128 + size - 1 <= high as u128;
            if aligned && fits {
                break;
            }
            bits -= 1;
        }

        let mask = if bits == 64 { 0 } else { width.max_value() & !((1u64 << bits) - 1) };
        out.push((cursor, mask));

        let next = cursor as u128 + (1u128 << bits);
        if next > high as u128 {
            return out;
        }
        cursor = next as u64;
    }
}

fn random_range(rng: &mut impl Rng, width: BitWidth) -> (u64, u64) {
    let a = rng.gen_range(0..=width.max_value());
    let b = rng.gen_range(0..=width.max_value());
    (a.min(b), a.max(b))
}

/// Checks that `cover` is sorted, valid, aligned and tiles `low..=high` exactly with no gaps and
/// no overlaps.
fn assert_tiles(cover: &Cover, low: u64, high: u64) {
    let width = cover.width();
    let mut expected_start = Some(low);

    for mv in cover {
        assert_eq!(mv.value() & mv.mask(), mv.value(), "{mv} has bits outside its mask");
        assert!(width.contains(mv.value()) && width.contains(mv.mask()), "{mv} out of domain");

        let free = mv.free_bits();
        if free < 64 {
            assert_eq!(mv.value() % (1u64 << free), 0, "{mv} is not aligned");
        }

        let range = mv.as_range().expect("blocks are contiguous");
        assert_eq!(Some(*range.start()), expected_start, "gap or overlap before {mv}");
        expected_start = range.end().checked_add(1);

        if *range.end() == high {
            expected_start = None;
        }
    }

    assert_eq!(expected_start, None, "cover stops before {high}");
    assert_eq!(cover.as_slice().last().and_then(MaskedValue::as_range).map(|r| *r.end()), Some(high));
}

#[test]
fn random_ranges_are_tiled_exactly() {
    let _ = tracing_subscriber::fmt::try_init();
    let mut rng = rand::thread_rng();

    for _ in 0..ROUNDS {
        let width = BitWidth::new(rng.gen_range(1..=64)).unwrap();
        let (low, high) = random_range(&mut rng, width);

        let cover = decompose(low, high, width).unwrap();
        assert_tiles(&cover, low, high);
        assert!(cover.len() <= 2 * width.bits() as usize);
        assert!(cover.contains(low) && cover.contains(high));
    }
}

#[test]
fn random_ranges_match_reference_scan() {
    let mut rng = rand::thread_rng();

    for _ in 0..ROUNDS {
        let width = BitWidth::new(rng.gen_range(1..=64)).unwrap();
        let (low, high) = random_range(&mut rng, width);

        let cover = decompose(low, high, width).unwrap();
        let pairs: Vec<_> = cover.iter().map(|mv| (mv.value(), mv.mask())).collect();
        assert_eq!(pairs, naive(low, high, width), "{low}..={high} ({width})");
    }
}

#[test]
fn random_ranges_are_deterministic() {
    let mut rng = rand::thread_rng();

    for _ in 0..ROUNDS / 10 {
        let (low, high) = random_range(&mut rng, BitWidth::PORT);
        assert_eq!(
            decompose(low, high, BitWidth::PORT).unwrap(),
            decompose(low, high, BitWidth::PORT).unwrap()
        );
    }
}

#[test]
fn degenerate_and_full_ranges() {
    let mut rng = rand::thread_rng();

    for bits in 1..=64 {
        let width = BitWidth::new(bits).unwrap();

        let full = decompose(0, width.max_value(), width).unwrap();
        assert_eq!(full.len(), 1);
        assert_eq!(full.as_slice()[0].mask(), 0);
        assert_eq!(full.as_slice()[0].value(), 0);

        let x = rng.gen_range(0..=width.max_value());
        let single = decompose(x, x, width).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single.as_slice()[0].mask(), width.max_value());
        assert_eq!(single.as_slice()[0].value(), x);
    }
}

#[test]
fn concurrent_callers_agree() {
    let expected = decompose(1000, 1999, BitWidth::PORT).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(|| decompose(1000, 1999, BitWidth::PORT).unwrap()))
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
