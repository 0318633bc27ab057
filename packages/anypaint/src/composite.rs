/// Blend operator applied when a compositing layer is flattened onto its
/// parent: the full OpenType COLR `CompositeMode` set, Porter-Duff
/// operators plus the separable and non-separable (HSL) blend modes.
///
/// Backends translate these through pure mapping tables so completeness is
/// independently testable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompositeMode {
    Clear,
    Src,
    Dest,
    SrcOver,
    DestOver,
    SrcIn,
    DestIn,
    SrcOut,
    DestOut,
    SrcAtop,
    DestAtop,
    Xor,
    Plus,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Multiply,
    HslHue,
    HslSaturation,
    HslColor,
    HslLuminosity,
}

impl CompositeMode {
    /// Every mode, for table-completeness tests.
    pub const ALL: [CompositeMode; 28] = [
        CompositeMode::Clear,
        CompositeMode::Src,
        CompositeMode::Dest,
        CompositeMode::SrcOver,
        CompositeMode::DestOver,
        CompositeMode::SrcIn,
        CompositeMode::DestIn,
        CompositeMode::SrcOut,
        CompositeMode::DestOut,
        CompositeMode::SrcAtop,
        CompositeMode::DestAtop,
        CompositeMode::Xor,
        CompositeMode::Plus,
        CompositeMode::Screen,
        CompositeMode::Overlay,
        CompositeMode::Darken,
        CompositeMode::Lighten,
        CompositeMode::ColorDodge,
        CompositeMode::ColorBurn,
        CompositeMode::HardLight,
        CompositeMode::SoftLight,
        CompositeMode::Difference,
        CompositeMode::Exclusion,
        CompositeMode::Multiply,
        CompositeMode::HslHue,
        CompositeMode::HslSaturation,
        CompositeMode::HslColor,
        CompositeMode::HslLuminosity,
    ];

    /// True for the plain Porter-Duff operators (everything up to `Plus`).
    pub fn is_porter_duff(self) -> bool {
        matches!(
            self,
            CompositeMode::Clear
                | CompositeMode::Src
                | CompositeMode::Dest
                | CompositeMode::SrcOver
                | CompositeMode::DestOver
                | CompositeMode::SrcIn
                | CompositeMode::DestIn
                | CompositeMode::SrcOut
                | CompositeMode::DestOut
                | CompositeMode::SrcAtop
                | CompositeMode::DestAtop
                | CompositeMode::Xor
                | CompositeMode::Plus
        )
    }
}
