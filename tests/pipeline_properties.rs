// Property tests for the decode → sort → encode pipeline
use pixel_defrag::defrag::decoder::decode_blocking;
use pixel_defrag::defrag::encoder::encode_png;
use pixel_defrag::defrag::sorter::{is_sorted, sort_pixels};
use pixel_defrag::defrag::{DefragConfig, Pixel, PixelBuffer};
use proptest::prelude::*;

fn channel() -> impl Strategy<Value = u8> {
    // 小取值域制造大量重复像素
    prop_oneof![any::<u8>(), 0u8..3]
}

fn pixel() -> impl Strategy<Value = Pixel> {
    (channel(), channel(), channel(), channel()).prop_map(Pixel::from)
}

fn pixel_buffer() -> impl Strategy<Value = PixelBuffer> {
    (1u32..=12, 1u32..=12).prop_flat_map(|(width, height)| {
        prop::collection::vec(pixel(), (width * height) as usize).prop_map(move |pixels| {
            PixelBuffer::from_pixels(width, height, &pixels).expect("strategy yields valid buffers")
        })
    })
}

proptest! {
    #[test]
    fn sorted_output_is_a_permutation(buffer in pixel_buffer()) {
        let sorted = sort_pixels(&buffer);

        let mut expected = buffer.to_pixels();
        expected.sort();
        let mut actual = sorted.to_pixels();
        actual.sort();

        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn adjacent_pixels_are_ordered(buffer in pixel_buffer()) {
        let sorted = sort_pixels(&buffer).to_pixels();

        for pair in sorted.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let key = |p: Pixel| (p.r(), p.g(), p.b(), p.a());
            prop_assert!(key(a) <= key(b), "{:?} > {:?}", a, b);
        }
    }

    #[test]
    fn sorting_is_idempotent(buffer in pixel_buffer()) {
        let once = sort_pixels(&buffer);
        let twice = sort_pixels(&once);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn sorting_is_deterministic(buffer in pixel_buffer()) {
        prop_assert_eq!(sort_pixels(&buffer), sort_pixels(&buffer.clone()));
    }

    #[test]
    fn dimensions_are_preserved(buffer in pixel_buffer()) {
        let sorted = sort_pixels(&buffer);
        prop_assert_eq!(sorted.width(), buffer.width());
        prop_assert_eq!(sorted.height(), buffer.height());
        prop_assert!(is_sorted(&sorted));
    }

    #[test]
    fn png_encoding_roundtrips_exactly(buffer in pixel_buffer()) {
        let bytes = encode_png(&buffer).expect("encode should succeed");
        let decoded =
            decode_blocking(&bytes, &DefragConfig::default()).expect("decode should succeed");
        prop_assert_eq!(decoded, buffer);
    }

    #[test]
    fn uniform_buffers_sort_to_themselves(
        width in 1u32..=10,
        height in 1u32..=10,
        value in pixel(),
    ) {
        let pixels = vec![value; (width * height) as usize];
        let buffer = PixelBuffer::from_pixels(width, height, &pixels).expect("valid buffer");
        prop_assert_eq!(sort_pixels(&buffer), buffer);
    }
}

#[test]
fn one_by_one_buffer_sorts_to_itself() {
    let buffer =
        PixelBuffer::from_pixels(1, 1, &[Pixel::new(12, 34, 56, 78)]).expect("valid buffer");
    assert_eq!(sort_pixels(&buffer), buffer);
}

#[test]
fn three_pixel_row_scenario() {
    let input = PixelBuffer::from_pixels(
        3,
        1,
        &[
            Pixel::new(10, 0, 0, 255),
            Pixel::new(0, 5, 0, 255),
            Pixel::new(0, 0, 0, 255),
        ],
    )
    .expect("valid buffer");

    let sorted = sort_pixels(&input);

    assert_eq!(
        sorted.to_pixels(),
        vec![
            Pixel::new(0, 0, 0, 255),
            Pixel::new(0, 5, 0, 255),
            Pixel::new(10, 0, 0, 255),
        ]
    );
    assert_eq!((sorted.width(), sorted.height()), (3, 1));
}
