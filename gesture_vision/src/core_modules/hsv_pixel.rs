// THEORY (HSV Pixel):
// The `HsvPixel` is the unit the color model is expressed in. It is a "dumb" data
// container for one color in the hue/saturation/value space; the conversion of
// whole frames into that space happens in OpenCV (see `mat_bridge`).
//
// Why HSV?
// - Hue isolates the identity of a color from how brightly it is lit, so a
//   tracked object stays inside the same hue band as it moves through shadows.
// - Saturation and value can then be bounded loosely to reject grey and black
//   pixels without caring about the exact lighting.
//
// Scale (OpenCV's 8-bit convention):
// - hue:        0..=179  (degrees / 2, so the full circle fits in a byte)
// - saturation: 0..=255
// - value:      0..=255

pub mod hsv_pixel {
    use opencv::core::Scalar;

    pub type Hue = u8;
    pub type Saturation = u8;
    pub type Value = u8;

    /// Largest legal hue on the 8-bit scale.
    pub const HUE_MAX: Hue = 179;
    /// Largest legal saturation or value.
    pub const CHANNEL_MAX: u8 = 255;

    /// A "dumb" data container representing a single HSV color.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HsvPixel {
        /// The hue (0-179).
        pub hue: Hue,
        /// The saturation (0-255).
        pub saturation: Saturation,
        /// The value, or brightness (0-255).
        pub value: Value,
    }

    impl HsvPixel {
        pub const fn new(hue: Hue, saturation: Saturation, value: Value) -> Self {
            Self {
                hue,
                saturation,
                value,
            }
        }

        pub fn from_channels(channels: [u8; 3]) -> Self {
            Self::new(channels[0], channels[1], channels[2])
        }

        pub fn channels(&self) -> [u8; 3] {
            [self.hue, self.saturation, self.value]
        }

        /// The bound as an OpenCV scalar, for `in_range`.
        pub fn to_scalar(&self) -> Scalar {
            Scalar::new(self.hue as f64, self.saturation as f64, self.value as f64, 0.0)
        }
    }
}
