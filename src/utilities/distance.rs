use crate::utilities::structs::Point;

/// Squared Euclidean distance. No square root: argmin does not need it.
#[inline]
pub fn squared_distance(a: &Point, b: &Point) -> f32 {
    let x = a.x - b.x;
    let y = a.y - b.y;
    x * x + y * y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pythagorean_triple() {
        let d = squared_distance(&Point::new(0.0, 0.0), &Point::new(3.0, 4.0));
        assert_eq!(d, 25.0);
    }

    #[test]
    fn symmetric_and_zero_on_self() {
        let a = Point::new(-1.5, 2.25);
        let b = Point::new(4.0, -0.5);
        assert_eq!(squared_distance(&a, &b), squared_distance(&b, &a));
        assert_eq!(squared_distance(&a, &a), 0.0);
    }
}
