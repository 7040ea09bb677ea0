use ratatui::layout::Rect;

/// Place a hotspot button inside the panel map area from its percentage
/// coordinates. The button is one row tall; anything that would spill past
/// the area edge is pulled back in so the label stays visible.
pub fn hotspot_rect(area: Rect, top_pct: f64, left_pct: f64, button_width: u16) -> Rect {
    let width = button_width.min(area.width);
    let inner_w = area.width.saturating_sub(width);
    let inner_h = area.height.saturating_sub(1);

    let x_off = (left_pct.clamp(0.0, 100.0) / 100.0 * area.width as f64) as u16;
    let y_off = (top_pct.clamp(0.0, 100.0) / 100.0 * area.height as f64) as u16;

    Rect {
        x: area.x + x_off.min(inner_w),
        y: area.y + y_off.min(inner_h),
        width,
        height: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect {
        Rect {
            x: 10,
            y: 5,
            width: 100,
            height: 20,
        }
    }

    #[test]
    fn test_hotspot_rect_positions_by_percentage() {
        let r = hotspot_rect(area(), 50.0, 25.0, 12);
        assert_eq!(r.x, 10 + 25);
        assert_eq!(r.y, 5 + 10);
        assert_eq!(r.width, 12);
        assert_eq!(r.height, 1);
    }

    #[test]
    fn test_hotspot_rect_clamps_to_area_edge() {
        let r = hotspot_rect(area(), 100.0, 100.0, 12);
        assert!(r.x + r.width <= 10 + 100);
        assert!(r.y < 5 + 20);
    }

    #[test]
    fn test_hotspot_rect_wider_than_area() {
        let small = Rect {
            x: 0,
            y: 0,
            width: 8,
            height: 3,
        };
        let r = hotspot_rect(small, 0.0, 0.0, 12);
        assert_eq!(r.width, 8);
        assert_eq!(r.x, 0);
    }

    #[test]
    fn test_hotspot_rect_out_of_range_percentages() {
        let r = hotspot_rect(area(), -10.0, 150.0, 10);
        assert_eq!(r.y, 5);
        assert!(r.x + r.width <= 10 + 100);
    }
}
