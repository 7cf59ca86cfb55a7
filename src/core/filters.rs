use crate::models::{Dorm, Rate, Rates, RoomType};

/// Check whether a free-form requested room type refers to a canonical
/// catalog type.
///
/// Numeric and word variants are accepted: "2"/"two" mean Double, "1"/"one"
/// mean Single, and a plain "suite" request matches both Suite and
/// Single Suite.
#[inline]
pub fn requested_matches(requested: &str, room_type: RoomType) -> bool {
    let req = requested.trim().to_lowercase();
    if req.contains('2') || req.contains("two") || req == "double" {
        return room_type == RoomType::Double;
    }
    if req.contains('1') || req.contains("one") || req == "single" {
        return room_type == RoomType::Single;
    }
    if req == "suite" {
        return matches!(room_type, RoomType::Suite | RoomType::SingleSuite);
    }
    RoomType::parse(&req) == Some(room_type)
}

/// Rates of a dorm that match the requested room type, cheapest first.
///
/// This is the hard filter: an empty result excludes the dorm from ranking
/// entirely. A dorm publishing a min/max range matches through its offered
/// room types, priced at the range minimum.
pub fn matching_rates(dorm: &Dorm, requested: &str) -> Vec<Rate> {
    let mut matched: Vec<Rate> = match &dorm.rates {
        Rates::PerType(rates) => rates
            .iter()
            .filter(|rate| requested_matches(requested, rate.room_type))
            .cloned()
            .collect(),
        Rates::Range(range) => dorm
            .room_types
            .iter()
            .filter(|room_type| requested_matches(requested, **room_type))
            .map(|room_type| Rate {
                room_type: *room_type,
                amount: range.min,
            })
            .collect(),
    };
    matched.sort_by(|a, b| a.amount.partial_cmp(&b.amount).unwrap_or(std::cmp::Ordering::Equal));
    matched
}

/// Whether the dorm lists the requested room type among its offerings.
/// Feeds the room-type sub-score, which is stricter than the hard filter.
#[inline]
pub fn room_type_offered(dorm: &Dorm, requested: &str) -> bool {
    dorm.room_types
        .iter()
        .any(|room_type| requested_matches(requested, *room_type))
}
