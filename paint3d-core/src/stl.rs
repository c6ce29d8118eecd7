//! STL mesh loader for binary and ASCII formats
//!
//! Stored facet normals are ignored: normals are always recomputed from the
//! vertex winding so culling and shading agree with the geometry.

use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    combinator::opt,
    multi::many0,
    number::complete::{float, le_f32, le_u16, le_u32},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::geometry::{Mesh, Triangle};
use crate::math::Vec3;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Parse a binary STL file
pub fn parse_binary_stl(name: &str, data: &[u8]) -> Result<Mesh> {
    if data.len() < HEADER_LEN + 4 {
        return Err(Error::Stl("file too small to be a valid STL".to_string()));
    }

    let (body, count) = le_u32::<_, nom::error::Error<&[u8]>>(&data[HEADER_LEN..])
        .map_err(|e| Error::Stl(format!("bad triangle count: {e:?}")))?;
    let count = count as usize;
    let expected = count
        .checked_mul(FACET_LEN)
        .ok_or_else(|| Error::Stl(format!("triangle count {count} overflows")))?;
    if body.len() < expected {
        return Err(Error::Stl(format!(
            "unexpected end of file: {count} triangles need {expected} bytes, found {}",
            body.len()
        )));
    }

    let mut triangles = Vec::with_capacity(count);
    let mut input = body;
    for _ in 0..count {
        let (rest, triangle) =
            binary_facet(input).map_err(|e| Error::Stl(format!("bad facet: {e:?}")))?;
        triangles.push(triangle);
        input = rest;
    }

    let mesh = Mesh::new(name, triangles)?;
    tracing::info!(name, triangles = mesh.triangles().len(), "loaded binary STL");
    Ok(mesh)
}

fn binary_vector(input: &[u8]) -> IResult<&[u8], Vec3> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Vec3::new(x, y, z)))
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    let (input, _normal) = binary_vector(input)?;
    let (input, (v0, v1, v2)) = tuple((binary_vector, binary_vector, binary_vector))(input)?;
    let (input, _attributes) = le_u16(input)?;
    Ok((input, Triangle::new(v0, v1, v2)))
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(name: &str, input: &str) -> Result<Mesh> {
    let triangles = match ascii_solid(input) {
        Ok((_, triangles)) => triangles,
        Err(e) => return Err(Error::Stl(format!("failed to parse ASCII STL: {e:?}"))),
    };
    let mesh = Mesh::new(name, triangles)?;
    tracing::info!(name, triangles = mesh.triangles().len(), "loaded ASCII STL");
    Ok(mesh)
}

fn ascii_solid(input: &str) -> IResult<&str, Vec<Triangle>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, triangles) = many0(ascii_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _) = opt(not_line_ending)(input)?;
    Ok((input, triangles))
}

fn ascii_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = ascii_vector(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v0) = ascii_vertex(input)?;
    let (input, v1) = ascii_vertex(input)?;
    let (input, v2) = ascii_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, Triangle::new(v0, v1, v2)))
}

fn ascii_vertex(input: &str) -> IResult<&str, Vec3> {
    preceded(preceded(multispace0, tag("vertex")), ascii_vector)(input)
}

fn ascii_vector(input: &str) -> IResult<&str, Vec3> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, Vec3::new(x, y, z)))
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(name: &str, data: &[u8]) -> Result<Mesh> {
    // Binary files may also start with "solid", so fall back on failure
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            match parse_ascii_stl(name, text) {
                Ok(mesh) => return Ok(mesh),
                Err(e) => tracing::warn!(name, error = %e, "not ASCII STL, trying binary"),
            }
        }
    }

    parse_binary_stl(name, data)
}
