use ovs_mask::{decompose, BitWidth, Error};

/// Every range of every small domain: each integer must be matched by exactly one entry if it is
/// inside the range, and by none otherwise.
#[test]
fn small_domains_cover_exactly() {
    for bits in 1..=7 {
        let width = BitWidth::new(bits).unwrap();
        let max = width.max_value();

        for low in 0..=max {
            for high in low..=max {
                let cover = decompose(low, high, width).unwrap();

                for x in 0..=max {
                    let hits = cover.iter().filter(|mv| mv.matches(x)).count();
                    let inside = (low..=high).contains(&x);
                    assert_eq!(hits, inside as usize, "{x} in {low}..={high} ({width})");
                }
            }
        }
    }
}

#[test]
fn small_domains_reject_bad_input() {
    for bits in 1..=7 {
        let width = BitWidth::new(bits).unwrap();
        let max = width.max_value();

        assert_eq!(
            decompose(0, max + 1, width),
            Err(Error::OutOfDomain { value: max + 1, width })
        );
        assert_eq!(
            decompose(max + 1, max + 1, width),
            Err(Error::OutOfDomain { value: max + 1, width })
        );
        if max > 0 {
            assert_eq!(decompose(max, 0, width), Err(Error::InvalidRange { low: max, high: 0 }));
        }
    }
}
