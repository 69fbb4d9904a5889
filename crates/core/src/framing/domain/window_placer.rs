use crate::framing::domain::placement::Placement;
use crate::shared::constants::{FALLBACK_WINDOW_SIZE, WINDOW_HEIGHT_DIVISOR};
use crate::shared::face_box::FaceBox;

/// Chooses the vertical offset of a fixed-height window that best frames
/// a set of faces.
///
/// The window is a third of the image height. Every integer offset in
/// `[0, image_height - size)` is scored and the first maximum wins. A face
/// contributes the part of it the window shows, plus a centeredness bonus
/// when it sits wholly inside the window or wholly covers it.
///
/// Stateless: one placer can serve any number of independent requests.
#[derive(Clone, Debug)]
pub struct WindowPlacer {
    fallback_size: f64,
}

impl WindowPlacer {
    pub fn new(fallback_size: f64) -> Self {
        Self { fallback_size }
    }

    /// Window height for an image; `None` and `Some(0)` use the fallback.
    pub fn window_size(&self, image_height: Option<i64>) -> f64 {
        match image_height {
            Some(h) if h != 0 => h as f64 / WINDOW_HEIGHT_DIVISOR,
            _ => self.fallback_size,
        }
    }

    /// Finds the best window offset for `faces` in an image `image_height`
    /// pixels tall.
    ///
    /// Returns [`Placement::Centered`] when nothing scores above zero,
    /// which includes empty face sets and heights that leave no room to
    /// slide the window.
    pub fn place(&self, faces: &[FaceBox], image_height: Option<i64>) -> Placement {
        let size = self.window_size(image_height);
        let span = image_height.unwrap_or(0) as f64 - size;
        if faces.is_empty() || span <= 0.0 {
            return Placement::Centered;
        }

        // Integer offsets strictly below `span`.
        let candidates = (span.ceil() as u64).min(u32::MAX as u64) as u32;

        let mut best_score = 0.0;
        let mut best_top = None;
        for top in 0..candidates {
            let score = score_window(faces, top as f64, size);
            if score > best_score {
                best_score = score;
                best_top = Some(top);
            }
        }

        best_top.map_or(Placement::Centered, Placement::Offset)
    }
}

impl Default for WindowPlacer {
    fn default() -> Self {
        Self::new(FALLBACK_WINDOW_SIZE)
    }
}

/// Total score of the window `[top, top + size)` over all faces.
pub fn score_window(faces: &[FaceBox], top: f64, size: f64) -> f64 {
    let bottom = top + size;
    faces
        .iter()
        .map(|face| score_face(face, top, bottom, size))
        .sum()
}

fn score_face(face: &FaceBox, top: f64, bottom: f64, size: f64) -> f64 {
    let face_top = face.top();
    let face_bottom = face.bottom();
    let face_height = face.height as f64;

    if face_bottom < top || face_top > bottom {
        // no overlap
        0.0
    } else if face_top > top && face_bottom < bottom {
        // inside: bonus for equal margins above and below
        let imbalance = ((bottom - face_bottom) - (face_top - top)).abs();
        face_height + face_height / (imbalance + 1.0)
    } else if face_top < top && face_bottom > bottom {
        // face covers the whole window
        let imbalance = ((face_bottom - bottom) - (top - face_top)).abs();
        size + face_height / (imbalance + 1.0)
    } else if face_top < top {
        face_bottom - top
    } else {
        bottom - face_bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn face(y: u32, height: u32) -> FaceBox {
        FaceBox::new(0, y, height, height)
    }

    fn place(faces: &[FaceBox], image_height: Option<i64>) -> Placement {
        WindowPlacer::default().place(faces, image_height)
    }

    // ── Window size ──────────────────────────────────────────────────

    #[rstest]
    #[case::third_of_height(Some(900), 300.0)]
    #[case::fractional(Some(1000), 1000.0 / 3.0)]
    #[case::zero_height(Some(0), 400.0)]
    #[case::unknown_height(None, 400.0)]
    #[case::negative_height(Some(-900), -300.0)]
    fn test_window_size(#[case] image_height: Option<i64>, #[case] expected: f64) {
        assert_relative_eq!(WindowPlacer::default().window_size(image_height), expected);
    }

    #[test]
    fn test_custom_fallback_size() {
        let placer = WindowPlacer::new(250.0);
        assert_relative_eq!(placer.window_size(None), 250.0);
        assert_relative_eq!(placer.window_size(Some(600)), 200.0);
    }

    // ── Per-case scoring ─────────────────────────────────────────────

    #[test]
    fn test_face_above_window_scores_zero() {
        assert_relative_eq!(score_window(&[face(0, 50)], 100.0, 300.0), 0.0);
    }

    #[test]
    fn test_face_below_window_scores_zero() {
        assert_relative_eq!(score_window(&[face(500, 50)], 100.0, 300.0), 0.0);
    }

    #[test]
    fn test_face_inside_with_equal_margins_gets_full_bonus() {
        // window [0, 300), face [100, 200): 100px above and below
        assert_relative_eq!(score_window(&[face(100, 100)], 0.0, 300.0), 200.0);
    }

    #[test]
    fn test_face_inside_off_center_gets_partial_bonus() {
        // window [0, 300), face [50, 150): margins 50 and 150
        let expected = 100.0 + 100.0 / 101.0;
        assert_relative_eq!(score_window(&[face(50, 100)], 0.0, 300.0), expected);
    }

    #[test]
    fn test_face_covering_window_scores_size_plus_bonus() {
        // window [300, 600), face [0, 900): 300px overhang each side
        assert_relative_eq!(score_window(&[face(0, 900)], 300.0, 300.0), 1200.0);
    }

    #[test]
    fn test_face_straddling_top_edge_scores_visible_part() {
        // window [150, 450), face [100, 200): 50px visible
        assert_relative_eq!(score_window(&[face(100, 100)], 150.0, 300.0), 50.0);
    }

    #[test]
    fn test_face_straddling_bottom_edge_scores_window_bottom_minus_face_bottom() {
        // window [0, 300), face [250, 350)
        assert_relative_eq!(score_window(&[face(250, 100)], 0.0, 300.0), -50.0);
    }

    #[test]
    fn test_face_flush_with_window_top_uses_bottom_edge_branch() {
        // window [100, 400), face [100, 200): not strictly inside
        assert_relative_eq!(score_window(&[face(100, 100)], 100.0, 300.0), 200.0);
    }

    #[test]
    fn test_scores_sum_over_faces() {
        let faces = [face(100, 100), face(150, 40)];
        let expected = score_window(&faces[..1], 0.0, 300.0) + score_window(&faces[1..], 0.0, 300.0);
        assert_relative_eq!(score_window(&faces, 0.0, 300.0), expected);
    }

    // ── Placement ────────────────────────────────────────────────────

    #[rstest]
    #[case::unknown(None)]
    #[case::zero(Some(0))]
    #[case::small(Some(300))]
    #[case::typical(Some(900))]
    #[case::negative(Some(-50))]
    fn test_no_faces_is_centered(#[case] image_height: Option<i64>) {
        assert_eq!(place(&[], image_height), Placement::Centered);
    }

    #[rstest]
    #[case::unknown(None)]
    #[case::zero(Some(0))]
    #[case::negative(Some(-900))]
    fn test_degenerate_height_is_centered_even_with_faces(#[case] image_height: Option<i64>) {
        assert_eq!(place(&[face(10, 100)], image_height), Placement::Centered);
    }

    #[test]
    fn test_single_face_golden_value() {
        // 900px image, 300px window. Offsets 0 and 100 both score 200;
        // the first one is kept.
        let faces = [face(100, 100)];
        assert_relative_eq!(score_window(&faces, 0.0, 300.0), 200.0);
        assert_relative_eq!(score_window(&faces, 100.0, 300.0), 200.0);
        assert_eq!(place(&faces, Some(900)), Placement::Offset(0));
        assert_eq!(place(&faces, Some(900)).to_string(), "-0px");
    }

    #[test]
    fn test_centered_face_puts_window_midpoint_on_image_midpoint() {
        // face [375, 525), midpoint 450 = image midpoint
        let faces = [face(375, 150)];
        let placement = place(&faces, Some(900));
        let top = placement.offset().unwrap() as f64;
        let window_mid = top + 150.0;
        assert!((window_mid - 450.0).abs() <= 1.0, "window midpoint {window_mid}");
    }

    #[test]
    fn test_tie_keeps_smallest_offset() {
        // Offsets 300 and 400 both score 200 for this face.
        let faces = [face(400, 100)];
        assert_relative_eq!(score_window(&faces, 300.0, 300.0), 200.0);
        assert_relative_eq!(score_window(&faces, 400.0, 300.0), 200.0);
        assert_eq!(place(&faces, Some(900)), Placement::Offset(300));
    }

    #[test]
    fn test_tie_between_two_faces_keeps_smallest_offset() {
        // Each face alone fills a window equally well; no window holds both.
        let faces = [face(100, 100), face(500, 100)];
        assert_relative_eq!(
            score_window(&faces, 0.0, 300.0),
            score_window(&faces, 400.0, 300.0)
        );
        assert_eq!(place(&faces, Some(900)), Placement::Offset(0));
    }

    #[test]
    fn test_face_order_does_not_matter() {
        let faces = [face(100, 100), face(500, 100), face(320, 60)];
        let reversed: Vec<FaceBox> = faces.iter().rev().copied().collect();
        assert_eq!(place(&faces, Some(900)), place(&reversed, Some(900)));
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let placer = WindowPlacer::default();
        let faces = [face(220, 80), face(610, 120)];
        let first = placer.place(&faces, Some(1200));
        for _ in 0..5 {
            assert_eq!(placer.place(&faces, Some(1200)), first);
        }
    }

    #[test]
    fn test_face_taller_than_window_centers_on_face() {
        assert_eq!(place(&[face(0, 900)], Some(900)), Placement::Offset(300));
    }

    #[test]
    fn test_face_outside_image_is_centered() {
        assert_eq!(place(&[face(2000, 100)], Some(900)), Placement::Centered);
    }

    #[test]
    fn test_only_negative_scores_is_centered() {
        // Every window either misses the face or straddles its bottom edge.
        // 600px image, 200px window, offsets 0..400; face [450, 750)
        let faces = [face(450, 300)];
        for top in 0..400 {
            assert!(score_window(&faces, top as f64, 200.0) <= 0.0, "top {top}");
        }
        assert_eq!(place(&faces, Some(600)), Placement::Centered);
    }

    #[test]
    fn test_small_image_centers_face_near_bottom() {
        // 300px image, 100px window: offsets 0..200, face [200, 250)
        let placement = place(&[face(200, 50)], Some(300));
        assert_eq!(placement, Placement::Offset(175));
    }

    #[test]
    fn test_fractional_window_size_scans_every_integer_offset() {
        // 1000px image: window 333.33, offsets 0..=666
        let placement = place(&[face(900, 50)], Some(1000));
        assert_eq!(placement, Placement::Offset(666));
    }

    #[test]
    fn test_positive_scores_form_a_single_peak() {
        let faces = [face(375, 150)];
        let scores: Vec<f64> = (0..600)
            .map(|top| score_window(&faces, top as f64, 300.0))
            .collect();

        let positive: Vec<usize> = (0..scores.len()).filter(|&t| scores[t] > 0.0).collect();
        let first = positive[0];
        let last = *positive.last().unwrap();
        assert_eq!(positive.len(), last - first + 1, "positive range is contiguous");

        let peak = (first..=last)
            .max_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap())
            .unwrap();
        assert_eq!(peak, 300);
        for t in first..peak {
            assert!(scores[t] < scores[t + 1], "rising at {t}");
        }
        for t in peak..last {
            assert!(scores[t] > scores[t + 1], "falling at {t}");
        }
    }
}
