//! Block concatenation
//!
//! Tiles are laid out in a grid: every tile in a grid row has the same number
//! of rows, every tile in a grid column the same number of columns. The
//! result is an owning [`GbMatrix`] whose fill is the tiles' shared fill, or
//! the fill type's default when they disagree.
//!
//! A grid shares one stored type. Two tiles of different stored types join
//! through [`hcat_promoted`] or [`vcat_promoted`]; a wider mixed grid is cast
//! (and refilled) to one array type first and then passed to [`cat`].

use crate::array::{AbstractGbArray, GbMatrix, OwningArray};
use crate::assign::harmonise;
use crate::config::global_config;
use crate::error::{Error, Result};
use crate::native::NativeMatrix;
use gbarray_core::{promote_order, resolve_fill, Element, EngineMatrix, Promote, Promoted};

fn concat_handles<T: Element>(tiles: &[Vec<&NativeMatrix<T>>]) -> Result<NativeMatrix<T>> {
    if tiles.is_empty() || tiles.iter().any(Vec::is_empty) {
        return Err(Error::InvalidArgument {
            arg: "tiles",
            reason: "tile grid must have at least one tile in every row".into(),
        });
    }
    let order = promote_order(tiles.iter().flatten().map(|t| t.storage_order()))
        .unwrap_or(global_config().default_order);
    log::debug!(
        "concatenating {}x{} tile grid ({order})",
        tiles.len(),
        tiles[0].len()
    );
    let mut out = NativeMatrix::concat(tiles)?;
    out.set_storage_order(order)?;
    Ok(out)
}

/// Concatenate a grid of tiles (`cat`)
///
/// Every tile has the stored type `A::Elem`, which the result keeps.
pub fn cat<A: AbstractGbArray>(tiles: &[Vec<&A>]) -> Result<GbMatrix<A::Elem, A::Fill>> {
    let handles: Vec<Vec<_>> = tiles
        .iter()
        .map(|row| row.iter().map(|t| t.handle()).collect())
        .collect();
    let fill = resolve_fill(tiles.iter().flatten().map(|t| t.fill()));
    GbMatrix::from_parts(concat_handles(&handles)?, fill)
}

/// Tiles side by side (`hcat`)
pub fn hcat<A: AbstractGbArray>(tiles: &[&A]) -> Result<GbMatrix<A::Elem, A::Fill>> {
    cat(&[tiles.to_vec()])
}

/// Tiles stacked top to bottom (`vcat`)
pub fn vcat<A: AbstractGbArray>(tiles: &[&A]) -> Result<GbMatrix<A::Elem, A::Fill>> {
    let grid: Vec<Vec<&A>> = tiles.iter().map(|&t| vec![t]).collect();
    cat(&grid)
}

type Joined<A, B> = GbMatrix<
    Promoted<<A as AbstractGbArray>::Elem, <B as AbstractGbArray>::Elem>,
    <A as AbstractGbArray>::Fill,
>;

fn cat_pair<A, B>(a: &A, b: &B, side_by_side: bool) -> Result<Joined<A, B>>
where
    A: AbstractGbArray,
    B: AbstractGbArray<Fill = A::Fill>,
    A::Elem: Promote<B::Elem>,
{
    let left = harmonise::<A::Elem, Promoted<A::Elem, B::Elem>>(a.handle())?;
    let right = harmonise::<B::Elem, Promoted<A::Elem, B::Elem>>(b.handle())?;
    let grid = if side_by_side {
        vec![vec![left.handle(), right.handle()]]
    } else {
        vec![vec![left.handle()], vec![right.handle()]]
    };
    let fill = resolve_fill([a.fill(), b.fill()]);
    GbMatrix::from_parts(concat_handles(&grid)?, fill)
}

/// Two tiles of different stored types side by side, in the joined type
pub fn hcat_promoted<A, B>(a: &A, b: &B) -> Result<Joined<A, B>>
where
    A: AbstractGbArray,
    B: AbstractGbArray<Fill = A::Fill>,
    A::Elem: Promote<B::Elem>,
{
    cat_pair(a, b, true)
}

/// Two tiles of different stored types stacked, in the joined type
pub fn vcat_promoted<A, B>(a: &A, b: &B) -> Result<Joined<A, B>>
where
    A: AbstractGbArray,
    B: AbstractGbArray<Fill = A::Fill>,
    A::Elem: Promote<B::Elem>,
{
    cat_pair(a, b, false)
}
