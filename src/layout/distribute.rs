//! Space distribution along one axis.

/// How an item claims space along a container's main axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlexSize {
    /// Exactly this many cells (treated as a floor)
    Fixed(u16),
    /// Proportional share of whatever is left after every floor is met.
    /// A weight of 0 counts as 1.
    Ratio(u16),
}

impl FlexSize {
    /// Fixed size, clamping negative counts to zero.
    pub fn fixed(cells: i32) -> Self {
        Self::Fixed(u16::try_from(cells.max(0)).unwrap_or(u16::MAX))
    }

    /// Proportional size, clamping weights below one to one.
    pub fn ratio(weight: i32) -> Self {
        Self::Ratio(u16::try_from(weight.max(1)).unwrap_or(u16::MAX))
    }

    /// Equal share of the remaining space.
    pub const fn fill() -> Self {
        Self::Ratio(1)
    }

    pub const fn is_ratio(&self) -> bool {
        matches!(self, Self::Ratio(_))
    }

    fn weight(self) -> Option<u64> {
        match self {
            Self::Fixed(_) => None,
            Self::Ratio(weight) => Some(u64::from(weight.max(1))),
        }
    }

    /// Effective floor for an item whose view declares `minimum`.
    pub fn floor(self, minimum: u16) -> u16 {
        match self {
            Self::Fixed(cells) => cells.max(minimum),
            Self::Ratio(_) => minimum,
        }
    }
}

/// Split `total` cells between items separated by `gap` cells.
///
/// `minimums` holds each item's declared floor. The result always sums to
/// `total - gap * (n - 1)` (saturating at zero), with one exception: when
/// every floor fits and no item is a `Ratio`, the surplus stays unallocated.
///
/// # Panics
/// If `sizes` and `minimums` differ in length.
pub fn distribute(total: u16, gap: u16, sizes: &[FlexSize], minimums: &[u16]) -> Vec<u16> {
    assert_eq!(
        sizes.len(),
        minimums.len(),
        "every flex item needs exactly one minimum"
    );
    let count = sizes.len();
    if count == 0 {
        return Vec::new();
    }

    let gaps = u64::from(gap) * (count as u64 - 1);
    let usable = u64::from(total).saturating_sub(gaps);
    if usable == 0 {
        return vec![0; count];
    }

    let floors: Vec<u64> = sizes
        .iter()
        .zip(minimums)
        .map(|(size, &minimum)| u64::from(size.floor(minimum)))
        .collect();
    let floor_sum: u64 = floors.iter().sum();

    let allocated = if floor_sum >= usable {
        scale_down(&floors, floor_sum, usable)
    } else {
        share_surplus(sizes, floors, usable - floor_sum)
    };

    allocated
        .into_iter()
        .map(|cells| u16::try_from(cells).unwrap_or(u16::MAX))
        .collect()
}

/// Shrink every floor by `usable / floor_sum`, then hand out the rounding
/// shortfall from the last item backward.
fn scale_down(floors: &[u64], floor_sum: u64, usable: u64) -> Vec<u64> {
    let mut allocated: Vec<u64> = floors
        .iter()
        .map(|floor| floor * usable / floor_sum)
        .collect();
    let shortfall = usable - allocated.iter().sum::<u64>();
    spread_from_end(&mut allocated, shortfall, |i| floors[i] > 0);
    allocated
}

/// Give every floor, then split `remaining` among ratio items by weight.
fn share_surplus(sizes: &[FlexSize], floors: Vec<u64>, remaining: u64) -> Vec<u64> {
    let mut allocated = floors;
    let weight_sum: u64 = sizes.iter().filter_map(|size| size.weight()).sum();
    if weight_sum == 0 {
        return allocated;
    }

    for (cells, size) in allocated.iter_mut().zip(sizes) {
        if let Some(weight) = size.weight() {
            *cells += remaining * weight / weight_sum;
        }
    }
    let handed_out: u64 = sizes
        .iter()
        .filter_map(|size| size.weight())
        .map(|weight| remaining * weight / weight_sum)
        .sum();
    spread_from_end(&mut allocated, remaining - handed_out, |i| sizes[i].is_ratio());
    allocated
}

fn spread_from_end(allocated: &mut [u64], mut amount: u64, eligible: impl Fn(usize) -> bool) {
    while amount > 0 {
        let mut gave = false;
        for i in (0..allocated.len()).rev() {
            if amount == 0 {
                break;
            }
            if eligible(i) {
                allocated[i] += 1;
                amount -= 1;
                gave = true;
            }
        }
        if !gave {
            break;
        }
    }
}
