use hra_land::partition;
use proptest::prelude::*;

proptest! {
    #[test]
    fn ranges_tile_the_index_space(total in 0usize..500, workers in 1usize..20) {
        let ranges = partition(total, workers);
        prop_assert!(ranges.len() <= workers);
        let mut next = 0;
        for range in &ranges {
            prop_assert_eq!(range.start, next);
            next = range.end;
        }
        prop_assert_eq!(next, total);

        let chunk = (total + workers - 1) / workers;
        if let Some((last, rest)) = ranges.split_last() {
            prop_assert!(rest.iter().all(|range| range.len() == chunk));
            prop_assert!(last.len() >= 1 && last.len() <= chunk);
        }
    }
}
