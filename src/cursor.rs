// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Decomposition of a field's declared type into a frame chain.
//!
//! A [`FrameChain`] lists every nested position of a column type in
//! depth-first, left-to-right declaration order. Each frame carries the
//! type at that position, its classified shape, and the annotations
//! addressed to it. For `HashMap<String, Vec<i32>>` the chain is:
//!
//! ```text
//! root        HashMap<String, Vec<i32>>   Map
//! 0           String                      Scalar(Text)
//! 1           Vec<i32>                    List
//! 1.0         i32                         Scalar(Int)
//! ```
//!
//! The chain never reorders frames. Codec and metadata resolution
//! consume it through [`FrameChain::current`] and [`FrameChain::advance`],
//! so a resolver that walks children out of declaration order fails with
//! [`ChainExhausted`] instead of silently pairing the wrong frame.

use std::fmt;

use syn::Type;

use crate::{
    annotations::{AnnotationSet, PathAnnotations},
    catalog::TypeCatalog,
    diagnostics::{ChainExhausted, Diagnostic, FieldScope, ViolationKind},
    shape::{TypeShape, classify, element_type, map_key_value}
};

/// Branch path addressing one frame inside a field's decomposition.
///
/// The root frame has the empty path; each step selects a child branch of
/// the frame above it. Map keys live on branch 0 and map values on branch
/// 1, matching the traversal order of [`FrameChain`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FramePath(Vec<usize>);

impl FramePath {
    /// Path of the field root frame.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from raw branch indexes, outermost first.
    #[must_use]
    pub fn from_branches(branches: Vec<usize>) -> Self {
        Self(branches)
    }

    /// Path of the `branch`-th child of this frame.
    #[must_use]
    pub fn child(&self, branch: usize) -> Self {
        let mut branches = self.0.clone();
        branches.push(branch);
        Self(branches)
    }

    /// Raw branch indexes, outermost first.
    #[must_use]
    pub fn branches(&self) -> &[usize] {
        &self.0
    }

    /// Nesting depth; the root frame has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len() + 1
    }

    /// Whether this is the root frame path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FramePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("root");
        }
        let rendered: Vec<String> = self.0.iter().map(usize::to_string).collect();
        f.write_str(&rendered.join("."))
    }
}

/// One step of a field's type decomposition.
#[derive(Debug, Clone)]
pub struct DecompositionFrame {
    path:        FramePath,
    ty:          Type,
    shape:       TypeShape,
    annotations: AnnotationSet
}

impl DecompositionFrame {
    /// Path of this frame inside the decomposition.
    #[must_use]
    pub fn path(&self) -> &FramePath {
        &self.path
    }

    /// Declared type at this position.
    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Classified shape of the type at this position.
    #[must_use]
    pub fn shape(&self) -> TypeShape {
        self.shape
    }

    /// Annotations addressed to this position.
    #[must_use]
    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// Nesting depth; the field root has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.depth()
    }
}

/// Depth-first decomposition of a field's declared type.
///
/// Construction threads flat `(path, annotations)` pairs onto the shape
/// tree, then the chain is consumed sequentially: [`FrameChain::current`]
/// reads the frame under the cursor and [`FrameChain::advance`] steps to
/// the next one.
#[derive(Debug, Clone)]
pub struct FrameChain {
    frames:   Vec<DecompositionFrame>,
    position: usize
}

impl FrameChain {
    /// Decompose `ty` and thread per-path annotations onto its frames.
    ///
    /// A `json` annotation stops decomposition at the frame it marks, so
    /// a JSON field always produces a single frame regardless of how the
    /// declared type nests.
    ///
    /// # Errors
    ///
    /// Returns a diagnostic when a type inside the decomposition has no
    /// recognized shape, when an annotation path addresses a position the
    /// declared type does not have, or when a column role marker sits on
    /// a nested position instead of the field itself.
    pub fn build(
        record: &str,
        field: &str,
        ty: &Type,
        annotations: &[PathAnnotations],
        catalog: &TypeCatalog
    ) -> Result<Self, Diagnostic> {
        let scope = FieldScope { record, field };
        let mut frames = Vec::new();
        push_frames(&scope, FramePath::root(), ty, annotations, catalog, &mut frames)?;

        for pair in annotations {
            if !frames.iter().any(|frame| frame.path == pair.path) {
                return Err(scope
                    .violation(
                        ViolationKind::Cardinality,
                        "annotation addresses a position the declared type does not have"
                    )
                    .with_actual(pair.path.to_string()));
            }
            if !pair.path.is_root()
                && let Some(marker) = pair.set.role_markers().into_iter().next()
            {
                return Err(scope
                    .violation(
                        ViolationKind::AnnotationCombination,
                        "column role annotations apply to the field itself, not nested positions"
                    )
                    .with_actual(format!("{} at {}", marker.as_str(), pair.path)));
            }
        }

        Ok(Self {
            frames,
            position: 0
        })
    }

    /// Frame under the cursor. Always valid: a chain holds at least the
    /// root frame and [`FrameChain::advance`] refuses to step past the end.
    #[must_use]
    pub fn current(&self) -> &DecompositionFrame {
        &self.frames[self.position]
    }

    /// Whether another frame follows the current one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.position + 1 < self.frames.len()
    }

    /// Step the cursor to the next frame and return it.
    ///
    /// # Errors
    ///
    /// Returns [`ChainExhausted`] when the current frame is the last one.
    pub fn advance(&mut self) -> Result<&DecompositionFrame, ChainExhausted> {
        if !self.has_next() {
            return Err(ChainExhausted);
        }
        self.position += 1;
        Ok(&self.frames[self.position])
    }

    /// Number of frames in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the chain holds no frames. A successfully built chain
    /// always holds at least the root frame.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// All frames in traversal order.
    #[must_use]
    pub fn frames(&self) -> &[DecompositionFrame] {
        &self.frames
    }

    /// Look up a frame by its path.
    #[must_use]
    pub fn frame_at(&self, path: &FramePath) -> Option<&DecompositionFrame> {
        self.frames.iter().find(|frame| &frame.path == path)
    }

    /// Annotations of the `branch`-th child of `parent`, or the empty set
    /// when that frame does not exist or carries none.
    #[must_use]
    pub fn child_annotations(&self, parent: &FramePath, branch: usize) -> AnnotationSet {
        self.frame_at(&parent.child(branch))
            .map(|frame| frame.annotations.clone())
            .unwrap_or_default()
    }
}

fn push_frames(
    scope: &FieldScope<'_>,
    path: FramePath,
    ty: &Type,
    annotations: &[PathAnnotations],
    catalog: &TypeCatalog,
    frames: &mut Vec<DecompositionFrame>
) -> Result<(), Diagnostic> {
    let set = set_at(annotations, &path);
    let shape = classify(ty, &set, catalog).map_err(|violation| violation.into_diagnostic(scope))?;
    frames.push(DecompositionFrame {
        path: path.clone(),
        ty: ty.clone(),
        shape,
        annotations: set
    });

    match shape {
        TypeShape::List | TypeShape::Set | TypeShape::Optional => {
            let Some(element) = element_type(ty) else {
                return Err(scope.violation(
                    ViolationKind::Shape,
                    "container type is missing its element parameter"
                ));
            };
            push_frames(scope, path.child(0), element, annotations, catalog, frames)?;
        }
        TypeShape::Map => {
            let Some((key, value)) = map_key_value(ty) else {
                return Err(scope.violation(
                    ViolationKind::Shape,
                    "map type is missing its key and value parameters"
                ));
            };
            push_frames(scope, path.child(0), key, annotations, catalog, frames)?;
            push_frames(scope, path.child(1), value, annotations, catalog, frames)?;
        }
        TypeShape::Tuple(_) => {
            if let Type::Tuple(tuple) = ty {
                for (branch, element) in tuple.elems.iter().enumerate() {
                    push_frames(scope, path.child(branch), element, annotations, catalog, frames)?;
                }
            }
        }
        _ => {}
    }

    Ok(())
}

fn set_at(annotations: &[PathAnnotations], path: &FramePath) -> AnnotationSet {
    annotations
        .iter()
        .find(|pair| &pair.path == path)
        .map(|pair| pair.set.clone())
        .unwrap_or_default()
}
