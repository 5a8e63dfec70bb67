//! Try-on request assembly

use futures::future::join_all;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::image::{encoder, EncodedImagePart, SourceFile};

/// Instruction sent after the images. Not user-editable.
pub const TRY_ON_INSTRUCTION: &str = "Take the clothing from the subsequent images and realistically dress the person from the first image with it. Crucially, you must preserve the original background from the person's photo exactly as it is. Do not change, replace, or alter the background in any way. If multiple clothing items are provided, combine them into a single coherent outfit. Create a photorealistic image of the person wearing the new outfit, seamlessly integrated into their original environment. The final image should show the person with the new clothes on, but in the exact same setting as the original photo.";

/// One element of the outbound payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPart {
    InlineImage(EncodedImagePart),
    Text(String),
}

/// Kinds of output the provider may return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseModality {
    Image,
    Text,
}

/// Person part, outfit parts in upload order, then the instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TryOnRequest {
    parts: Vec<RequestPart>,
    response_modalities: Vec<ResponseModality>,
}

impl TryOnRequest {
    /// Encode the person and outfit files concurrently and assemble the
    /// request in input order.
    pub async fn build(person: &SourceFile, outfits: &[SourceFile]) -> Result<Self> {
        if outfits.is_empty() {
            return Err(AppError::Validation(
                "A try-on request needs at least one outfit image".to_string(),
            ));
        }

        let (person_part, outfit_parts) = futures::join!(
            encoder::encode_part(person),
            join_all(outfits.iter().map(|file| encoder::encode_part(file)))
        );

        let mut parts = Vec::with_capacity(outfit_parts.len() + 2);
        parts.push(RequestPart::InlineImage(person_part));
        parts.extend(outfit_parts.into_iter().map(RequestPart::InlineImage));
        parts.push(RequestPart::Text(TRY_ON_INSTRUCTION.to_string()));

        Ok(Self {
            parts,
            response_modalities: vec![ResponseModality::Image, ResponseModality::Text],
        })
    }

    pub fn parts(&self) -> &[RequestPart] {
        &self.parts
    }

    pub fn response_modalities(&self) -> &[ResponseModality] {
        &self.response_modalities
    }

    /// All image parts; the first is the person
    pub fn image_parts(&self) -> Vec<&EncodedImagePart> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                RequestPart::InlineImage(image) => Some(image),
                RequestPart::Text(_) => None,
            })
            .collect()
    }

    pub fn instruction(&self) -> Option<&str> {
        match self.parts.last() {
            Some(RequestPart::Text(text)) => Some(text),
            _ => None,
        }
    }
}
