//! Type specifiers and qualifiers.

use crate::ast::expr::Expr;

/// Built-in GLSL type keywords. Each one lexes as a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Void,
    Float,
    Double,
    Int,
    Uint,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    DVec2,
    DVec3,
    DVec4,
    BVec2,
    BVec3,
    BVec4,
    IVec2,
    IVec3,
    IVec4,
    UVec2,
    UVec3,
    UVec4,
    Mat2,
    Mat3,
    Mat4,
    Mat2x2,
    Mat2x3,
    Mat2x4,
    Mat3x2,
    Mat3x3,
    Mat3x4,
    Mat4x2,
    Mat4x3,
    Mat4x4,
    DMat2,
    DMat3,
    DMat4,
    DMat2x2,
    DMat2x3,
    DMat2x4,
    DMat3x2,
    DMat3x3,
    DMat3x4,
    DMat4x2,
    DMat4x3,
    DMat4x4,
    AtomicUint,
    Sampler1D,
    Sampler1DShadow,
    Sampler1DArray,
    Sampler1DArrayShadow,
    ISampler1D,
    ISampler1DArray,
    USampler1D,
    USampler1DArray,
    Sampler2D,
    Sampler3D,
    SamplerCube,
    Sampler2DShadow,
    SamplerCubeShadow,
    Sampler2DArray,
    Sampler2DArrayShadow,
    SamplerCubeArray,
    SamplerCubeArrayShadow,
    ISampler2D,
    ISampler3D,
    ISamplerCube,
    ISampler2DArray,
    ISamplerCubeArray,
    USampler2D,
    USampler3D,
    USamplerCube,
    USampler2DArray,
    USamplerCubeArray,
    Sampler2DRect,
    Sampler2DRectShadow,
    ISampler2DRect,
    USampler2DRect,
    SamplerBuffer,
    ISamplerBuffer,
    USamplerBuffer,
    Sampler2DMs,
    ISampler2DMs,
    USampler2DMs,
    Sampler2DMsArray,
    ISampler2DMsArray,
    USampler2DMsArray,
    Image1D,
    IImage1D,
    UImage1D,
    Image1DArray,
    IImage1DArray,
    UImage1DArray,
    Image2D,
    IImage2D,
    UImage2D,
    Image3D,
    IImage3D,
    UImage3D,
    ImageCube,
    IImageCube,
    UImageCube,
    ImageBuffer,
    IImageBuffer,
    UImageBuffer,
    Image2DArray,
    IImage2DArray,
    UImage2DArray,
    ImageCubeArray,
    IImageCubeArray,
    UImageCubeArray,
    Image2DRect,
    IImage2DRect,
    UImage2DRect,
    Image2DMs,
    IImage2DMs,
    UImage2DMs,
    Image2DMsArray,
    IImage2DMsArray,
    UImage2DMsArray,
}

impl BuiltinType {
    /// Every built-in type, in the order the lexer registers them.
    pub const ALL: &'static [BuiltinType] = &[
        BuiltinType::Void,
        BuiltinType::Float,
        BuiltinType::Double,
        BuiltinType::Int,
        BuiltinType::Uint,
        BuiltinType::Bool,
        BuiltinType::Vec2,
        BuiltinType::Vec3,
        BuiltinType::Vec4,
        BuiltinType::DVec2,
        BuiltinType::DVec3,
        BuiltinType::DVec4,
        BuiltinType::BVec2,
        BuiltinType::BVec3,
        BuiltinType::BVec4,
        BuiltinType::IVec2,
        BuiltinType::IVec3,
        BuiltinType::IVec4,
        BuiltinType::UVec2,
        BuiltinType::UVec3,
        BuiltinType::UVec4,
        BuiltinType::Mat2,
        BuiltinType::Mat3,
        BuiltinType::Mat4,
        BuiltinType::Mat2x2,
        BuiltinType::Mat2x3,
        BuiltinType::Mat2x4,
        BuiltinType::Mat3x2,
        BuiltinType::Mat3x3,
        BuiltinType::Mat3x4,
        BuiltinType::Mat4x2,
        BuiltinType::Mat4x3,
        BuiltinType::Mat4x4,
        BuiltinType::DMat2,
        BuiltinType::DMat3,
        BuiltinType::DMat4,
        BuiltinType::DMat2x2,
        BuiltinType::DMat2x3,
        BuiltinType::DMat2x4,
        BuiltinType::DMat3x2,
        BuiltinType::DMat3x3,
        BuiltinType::DMat3x4,
        BuiltinType::DMat4x2,
        BuiltinType::DMat4x3,
        BuiltinType::DMat4x4,
        BuiltinType::AtomicUint,
        BuiltinType::Sampler1D,
        BuiltinType::Sampler1DShadow,
        BuiltinType::Sampler1DArray,
        BuiltinType::Sampler1DArrayShadow,
        BuiltinType::ISampler1D,
        BuiltinType::ISampler1DArray,
        BuiltinType::USampler1D,
        BuiltinType::USampler1DArray,
        BuiltinType::Sampler2D,
        BuiltinType::Sampler3D,
        BuiltinType::SamplerCube,
        BuiltinType::Sampler2DShadow,
        BuiltinType::SamplerCubeShadow,
        BuiltinType::Sampler2DArray,
        BuiltinType::Sampler2DArrayShadow,
        BuiltinType::SamplerCubeArray,
        BuiltinType::SamplerCubeArrayShadow,
        BuiltinType::ISampler2D,
        BuiltinType::ISampler3D,
        BuiltinType::ISamplerCube,
        BuiltinType::ISampler2DArray,
        BuiltinType::ISamplerCubeArray,
        BuiltinType::USampler2D,
        BuiltinType::USampler3D,
        BuiltinType::USamplerCube,
        BuiltinType::USampler2DArray,
        BuiltinType::USamplerCubeArray,
        BuiltinType::Sampler2DRect,
        BuiltinType::Sampler2DRectShadow,
        BuiltinType::ISampler2DRect,
        BuiltinType::USampler2DRect,
        BuiltinType::SamplerBuffer,
        BuiltinType::ISamplerBuffer,
        BuiltinType::USamplerBuffer,
        BuiltinType::Sampler2DMs,
        BuiltinType::ISampler2DMs,
        BuiltinType::USampler2DMs,
        BuiltinType::Sampler2DMsArray,
        BuiltinType::ISampler2DMsArray,
        BuiltinType::USampler2DMsArray,
        BuiltinType::Image1D,
        BuiltinType::IImage1D,
        BuiltinType::UImage1D,
        BuiltinType::Image1DArray,
        BuiltinType::IImage1DArray,
        BuiltinType::UImage1DArray,
        BuiltinType::Image2D,
        BuiltinType::IImage2D,
        BuiltinType::UImage2D,
        BuiltinType::Image3D,
        BuiltinType::IImage3D,
        BuiltinType::UImage3D,
        BuiltinType::ImageCube,
        BuiltinType::IImageCube,
        BuiltinType::UImageCube,
        BuiltinType::ImageBuffer,
        BuiltinType::IImageBuffer,
        BuiltinType::UImageBuffer,
        BuiltinType::Image2DArray,
        BuiltinType::IImage2DArray,
        BuiltinType::UImage2DArray,
        BuiltinType::ImageCubeArray,
        BuiltinType::IImageCubeArray,
        BuiltinType::UImageCubeArray,
        BuiltinType::Image2DRect,
        BuiltinType::IImage2DRect,
        BuiltinType::UImage2DRect,
        BuiltinType::Image2DMs,
        BuiltinType::IImage2DMs,
        BuiltinType::UImage2DMs,
        BuiltinType::Image2DMsArray,
        BuiltinType::IImage2DMsArray,
        BuiltinType::UImage2DMsArray,
    ];

    /// The GLSL source spelling of this type.
    pub fn glsl_name(&self) -> &'static str {
        match self {
            BuiltinType::Void => "void",
            BuiltinType::Float => "float",
            BuiltinType::Double => "double",
            BuiltinType::Int => "int",
            BuiltinType::Uint => "uint",
            BuiltinType::Bool => "bool",
            BuiltinType::Vec2 => "vec2",
            BuiltinType::Vec3 => "vec3",
            BuiltinType::Vec4 => "vec4",
            BuiltinType::DVec2 => "dvec2",
            BuiltinType::DVec3 => "dvec3",
            BuiltinType::DVec4 => "dvec4",
            BuiltinType::BVec2 => "bvec2",
            BuiltinType::BVec3 => "bvec3",
            BuiltinType::BVec4 => "bvec4",
            BuiltinType::IVec2 => "ivec2",
            BuiltinType::IVec3 => "ivec3",
            BuiltinType::IVec4 => "ivec4",
            BuiltinType::UVec2 => "uvec2",
            BuiltinType::UVec3 => "uvec3",
            BuiltinType::UVec4 => "uvec4",
            BuiltinType::Mat2 => "mat2",
            BuiltinType::Mat3 => "mat3",
            BuiltinType::Mat4 => "mat4",
            BuiltinType::Mat2x2 => "mat2x2",
            BuiltinType::Mat2x3 => "mat2x3",
            BuiltinType::Mat2x4 => "mat2x4",
            BuiltinType::Mat3x2 => "mat3x2",
            BuiltinType::Mat3x3 => "mat3x3",
            BuiltinType::Mat3x4 => "mat3x4",
            BuiltinType::Mat4x2 => "mat4x2",
            BuiltinType::Mat4x3 => "mat4x3",
            BuiltinType::Mat4x4 => "mat4x4",
            BuiltinType::DMat2 => "dmat2",
            BuiltinType::DMat3 => "dmat3",
            BuiltinType::DMat4 => "dmat4",
            BuiltinType::DMat2x2 => "dmat2x2",
            BuiltinType::DMat2x3 => "dmat2x3",
            BuiltinType::DMat2x4 => "dmat2x4",
            BuiltinType::DMat3x2 => "dmat3x2",
            BuiltinType::DMat3x3 => "dmat3x3",
            BuiltinType::DMat3x4 => "dmat3x4",
            BuiltinType::DMat4x2 => "dmat4x2",
            BuiltinType::DMat4x3 => "dmat4x3",
            BuiltinType::DMat4x4 => "dmat4x4",
            BuiltinType::AtomicUint => "atomic_uint",
            BuiltinType::Sampler1D => "sampler1D",
            BuiltinType::Sampler1DShadow => "sampler1DShadow",
            BuiltinType::Sampler1DArray => "sampler1DArray",
            BuiltinType::Sampler1DArrayShadow => "sampler1DArrayShadow",
            BuiltinType::ISampler1D => "isampler1D",
            BuiltinType::ISampler1DArray => "isampler1DArray",
            BuiltinType::USampler1D => "usampler1D",
            BuiltinType::USampler1DArray => "usampler1DArray",
            BuiltinType::Sampler2D => "sampler2D",
            BuiltinType::Sampler3D => "sampler3D",
            BuiltinType::SamplerCube => "samplerCube",
            BuiltinType::Sampler2DShadow => "sampler2DShadow",
            BuiltinType::SamplerCubeShadow => "samplerCubeShadow",
            BuiltinType::Sampler2DArray => "sampler2DArray",
            BuiltinType::Sampler2DArrayShadow => "sampler2DArrayShadow",
            BuiltinType::SamplerCubeArray => "samplerCubeArray",
            BuiltinType::SamplerCubeArrayShadow => "samplerCubeArrayShadow",
            BuiltinType::ISampler2D => "isampler2D",
            BuiltinType::ISampler3D => "isampler3D",
            BuiltinType::ISamplerCube => "isamplerCube",
            BuiltinType::ISampler2DArray => "isampler2DArray",
            BuiltinType::ISamplerCubeArray => "isamplerCubeArray",
            BuiltinType::USampler2D => "usampler2D",
            BuiltinType::USampler3D => "usampler3D",
            BuiltinType::USamplerCube => "usamplerCube",
            BuiltinType::USampler2DArray => "usampler2DArray",
            BuiltinType::USamplerCubeArray => "usamplerCubeArray",
            BuiltinType::Sampler2DRect => "sampler2DRect",
            BuiltinType::Sampler2DRectShadow => "sampler2DRectShadow",
            BuiltinType::ISampler2DRect => "isampler2DRect",
            BuiltinType::USampler2DRect => "usampler2DRect",
            BuiltinType::SamplerBuffer => "samplerBuffer",
            BuiltinType::ISamplerBuffer => "isamplerBuffer",
            BuiltinType::USamplerBuffer => "usamplerBuffer",
            BuiltinType::Sampler2DMs => "sampler2DMS",
            BuiltinType::ISampler2DMs => "isampler2DMS",
            BuiltinType::USampler2DMs => "usampler2DMS",
            BuiltinType::Sampler2DMsArray => "sampler2DMSArray",
            BuiltinType::ISampler2DMsArray => "isampler2DMSArray",
            BuiltinType::USampler2DMsArray => "usampler2DMSArray",
            BuiltinType::Image1D => "image1D",
            BuiltinType::IImage1D => "iimage1D",
            BuiltinType::UImage1D => "uimage1D",
            BuiltinType::Image1DArray => "image1DArray",
            BuiltinType::IImage1DArray => "iimage1DArray",
            BuiltinType::UImage1DArray => "uimage1DArray",
            BuiltinType::Image2D => "image2D",
            BuiltinType::IImage2D => "iimage2D",
            BuiltinType::UImage2D => "uimage2D",
            BuiltinType::Image3D => "image3D",
            BuiltinType::IImage3D => "iimage3D",
            BuiltinType::UImage3D => "uimage3D",
            BuiltinType::ImageCube => "imageCube",
            BuiltinType::IImageCube => "iimageCube",
            BuiltinType::UImageCube => "uimageCube",
            BuiltinType::ImageBuffer => "imageBuffer",
            BuiltinType::IImageBuffer => "iimageBuffer",
            BuiltinType::UImageBuffer => "uimageBuffer",
            BuiltinType::Image2DArray => "image2DArray",
            BuiltinType::IImage2DArray => "iimage2DArray",
            BuiltinType::UImage2DArray => "uimage2DArray",
            BuiltinType::ImageCubeArray => "imageCubeArray",
            BuiltinType::IImageCubeArray => "iimageCubeArray",
            BuiltinType::UImageCubeArray => "uimageCubeArray",
            BuiltinType::Image2DRect => "image2DRect",
            BuiltinType::IImage2DRect => "iimage2DRect",
            BuiltinType::UImage2DRect => "uimage2DRect",
            BuiltinType::Image2DMs => "image2DMS",
            BuiltinType::IImage2DMs => "iimage2DMS",
            BuiltinType::UImage2DMs => "uimage2DMS",
            BuiltinType::Image2DMsArray => "image2DMSArray",
            BuiltinType::IImage2DMsArray => "iimage2DMSArray",
            BuiltinType::UImage2DMsArray => "uimage2DMSArray",
        }
    }

    /// Whether this is an opaque handle type (sampler, image, or atomic
    /// counter) that binds to a texture or image unit.
    pub fn is_opaque(&self) -> bool {
        if *self == BuiltinType::AtomicUint {
            return true;
        }
        let name = self.glsl_name();
        name.contains("sampler") || name.contains("image")
    }
}

/// Storage qualifier keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageQualifier {
    Const,
    In,
    Out,
    Inout,
    Centroid,
    Patch,
    Sample,
    Uniform,
    Buffer,
    Shared,
    Coherent,
    Volatile,
    Restrict,
    Readonly,
    Writeonly,
}

impl StorageQualifier {
    pub const ALL: &'static [StorageQualifier] = &[
        StorageQualifier::Const,
        StorageQualifier::In,
        StorageQualifier::Out,
        StorageQualifier::Inout,
        StorageQualifier::Centroid,
        StorageQualifier::Patch,
        StorageQualifier::Sample,
        StorageQualifier::Uniform,
        StorageQualifier::Buffer,
        StorageQualifier::Shared,
        StorageQualifier::Coherent,
        StorageQualifier::Volatile,
        StorageQualifier::Restrict,
        StorageQualifier::Readonly,
        StorageQualifier::Writeonly,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            StorageQualifier::Const => "const",
            StorageQualifier::In => "in",
            StorageQualifier::Out => "out",
            StorageQualifier::Inout => "inout",
            StorageQualifier::Centroid => "centroid",
            StorageQualifier::Patch => "patch",
            StorageQualifier::Sample => "sample",
            StorageQualifier::Uniform => "uniform",
            StorageQualifier::Buffer => "buffer",
            StorageQualifier::Shared => "shared",
            StorageQualifier::Coherent => "coherent",
            StorageQualifier::Volatile => "volatile",
            StorageQualifier::Restrict => "restrict",
            StorageQualifier::Readonly => "readonly",
            StorageQualifier::Writeonly => "writeonly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrecisionQualifier {
    High,
    Medium,
    Low,
}

impl PrecisionQualifier {
    pub fn keyword(&self) -> &'static str {
        match self {
            PrecisionQualifier::High => "highp",
            PrecisionQualifier::Medium => "mediump",
            PrecisionQualifier::Low => "lowp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterpolationQualifier {
    Smooth,
    Flat,
    NoPerspective,
}

impl InterpolationQualifier {
    pub fn keyword(&self) -> &'static str {
        match self {
            InterpolationQualifier::Smooth => "smooth",
            InterpolationQualifier::Flat => "flat",
            InterpolationQualifier::NoPerspective => "noperspective",
        }
    }
}

/// A single identifier inside `layout(...)`, with an optional constant
/// value. The bare `shared` keyword is stored as a layout id named
/// `shared` with no value.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutId {
    pub name: String,
    pub value: Option<Expr>,
}

impl LayoutId {
    pub fn new(name: impl Into<String>, value: Option<Expr>) -> Self {
        Self { name: name.into(), value }
    }

    pub fn shared() -> Self {
        Self::new("shared", None)
    }
}

/// One qualifier in a qualifier list. Declarations carry an ordered
/// `Vec<TypeQualifier>` so the printed order matches the parsed order.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeQualifier {
    Storage(StorageQualifier),
    Layout(Vec<LayoutId>),
    Precision(PrecisionQualifier),
    Interpolation(InterpolationQualifier),
    Invariant,
    Precise,
    /// `subroutine` with optional parenthesized type names.
    Subroutine(Vec<String>),
}

/// A type without qualifiers. Array specifiers wrap the element type, so
/// `float[2][3]` is an array of 2 arrays of 3 floats.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpecifier {
    Builtin(BuiltinType),
    /// A user-declared type referenced by name.
    Named(String),
    Struct(StructSpecifier),
    Array {
        element: Box<TypeSpecifier>,
        /// `None` for an unsized `[]` specifier.
        size: Option<Box<Expr>>,
    },
}

impl TypeSpecifier {
    /// Wraps `self` in array specifiers, outermost first.
    pub fn with_arrays(self, sizes: Vec<Option<Expr>>) -> TypeSpecifier {
        let mut result = self;
        for size in sizes.into_iter().rev() {
            result = TypeSpecifier::Array {
                element: Box::new(result),
                size: size.map(Box::new),
            };
        }
        result
    }

    /// The innermost non-array specifier.
    pub fn element_type(&self) -> &TypeSpecifier {
        match self {
            TypeSpecifier::Array { element, .. } => element.element_type(),
            other => other,
        }
    }
}

/// A type specifier together with its qualifier list.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecifiedType {
    pub qualifiers: Vec<TypeQualifier>,
    pub specifier: TypeSpecifier,
}

impl SpecifiedType {
    pub fn new(qualifiers: Vec<TypeQualifier>, specifier: TypeSpecifier) -> Self {
        Self { qualifiers, specifier }
    }

    pub fn unqualified(specifier: TypeSpecifier) -> Self {
        Self::new(Vec::new(), specifier)
    }

    /// Looks up a storage qualifier in the qualifier list.
    pub fn has_storage(&self, storage: StorageQualifier) -> bool {
        self.qualifiers
            .iter()
            .any(|q| matches!(q, TypeQualifier::Storage(s) if *s == storage))
    }

    /// Finds the value of a named layout id, if present.
    pub fn layout_value(&self, name: &str) -> Option<&Expr> {
        self.qualifiers.iter().find_map(|q| match q {
            TypeQualifier::Layout(ids) => ids
                .iter()
                .find(|id| id.name == name)
                .and_then(|id| id.value.as_ref()),
            _ => None,
        })
    }
}

/// `struct [name] { fields }`. Multi-declarator field lines are expanded
/// into one [`StructField`] per declarator.
#[derive(Debug, Clone, PartialEq)]
pub struct StructSpecifier {
    pub name: Option<String>,
    pub fields: Vec<StructField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub ty: SpecifiedType,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_specifiers_wrap_outermost_first() {
        let ty = TypeSpecifier::Builtin(BuiltinType::Float)
            .with_arrays(vec![Some(Expr::int(2)), Some(Expr::int(3))]);
        let TypeSpecifier::Array { element, size } = &ty else {
            panic!("expected array");
        };
        assert_eq!(size.as_deref(), Some(&Expr::int(2)));
        let TypeSpecifier::Array { element, size } = element.as_ref() else {
            panic!("expected nested array");
        };
        assert_eq!(size.as_deref(), Some(&Expr::int(3)));
        assert_eq!(element.as_ref(), &TypeSpecifier::Builtin(BuiltinType::Float));
    }

    #[test]
    fn opaque_types() {
        assert!(BuiltinType::Sampler2D.is_opaque());
        assert!(BuiltinType::UImage2DMsArray.is_opaque());
        assert!(BuiltinType::AtomicUint.is_opaque());
        assert!(!BuiltinType::Mat4.is_opaque());
    }

    #[test]
    fn every_builtin_is_registered() {
        for ty in BuiltinType::ALL {
            assert!(!ty.glsl_name().is_empty());
        }
        assert!(BuiltinType::ALL.contains(&BuiltinType::Image2DMsArray));
    }
}
