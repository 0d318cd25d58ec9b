//! Minimal SPIR-V reflection.
//!
//! Walks the instruction stream once, collecting debug names and
//! descriptor decorations into a small, stable schema. Deliberately not
//! a re-export of any compiler-internal layout object.

use fxhash::FxHashMap;
use lumen_render::pipeline::ShaderStage;
use spirv_headers::{Decoration, Op};

/// Reflection data for one linked program target.
#[derive(Clone, Debug, PartialEq)]
pub struct ReflectionLayout {
    pub entry_point: String,
    pub stage: ShaderStage,
    /// Descriptor-decorated resources, sorted by `(set, binding)`.
    pub bindings: Vec<BindingReflection>,
}

/// One descriptor-decorated resource. `name` is the debug name when the
/// module carries one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BindingReflection {
    pub name: Option<String>,
    pub set: u32,
    pub binding: u32,
}

const SPIRV_MAGIC: u32 = 0x0723_0203;
const HEADER_WORDS: usize = 5;

/// Extracts the binding table of a SPIR-V module.
pub fn reflect_spirv(
    entry_point: &str,
    stage: ShaderStage,
    words: &[u32],
) -> Result<ReflectionLayout, String> {
    if words.len() < HEADER_WORDS || words[0] != SPIRV_MAGIC {
        return Err("malformed SPIR-V module".to_string());
    }

    let mut names: FxHashMap<u32, String> = FxHashMap::default();
    let mut sets: FxHashMap<u32, u32> = FxHashMap::default();
    let mut bindings: FxHashMap<u32, u32> = FxHashMap::default();
    let mut entry_points: Vec<String> = Vec::new();

    let mut offset = HEADER_WORDS;
    while offset < words.len() {
        let word = words[offset];
        let word_count = (word >> 16) as usize;
        let opcode = word & 0xffff;
        if word_count == 0 || offset + word_count > words.len() {
            return Err("truncated SPIR-V instruction stream".to_string());
        }
        let operands = &words[offset + 1..offset + word_count];

        if opcode == Op::Name as u32 {
            if operands.len() >= 2 {
                names.insert(operands[0], decode_string(&operands[1..]));
            }
        } else if opcode == Op::EntryPoint as u32 {
            if operands.len() >= 3 {
                entry_points.push(decode_string(&operands[2..]));
            }
        } else if opcode == Op::Decorate as u32 && operands.len() >= 3 {
            if operands[1] == Decoration::DescriptorSet as u32 {
                sets.insert(operands[0], operands[2]);
            } else if operands[1] == Decoration::Binding as u32 {
                bindings.insert(operands[0], operands[2]);
            }
        }

        offset += word_count;
    }

    if !entry_points.is_empty() && !entry_points.iter().any(|name| name == entry_point) {
        return Err(format!(
            "entry point '{}' is not exported by the module",
            entry_point
        ));
    }

    let mut out: Vec<BindingReflection> = bindings
        .iter()
        .map(|(&id, &binding)| BindingReflection {
            name: names.get(&id).cloned().filter(|n| !n.is_empty()),
            set: sets.get(&id).copied().unwrap_or(0),
            binding,
        })
        .collect();
    out.sort_by_key(|b| (b.set, b.binding));

    Ok(ReflectionLayout {
        entry_point: entry_point.to_string(),
        stage,
        bindings: out,
    })
}

/// Null-terminated UTF-8 packed into little-endian words.
fn decode_string(words: &[u32]) -> String {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    'words: for word in words {
        for byte in &word.to_le_bytes() {
            if *byte == 0 {
                break 'words;
            }
            bytes.push(*byte);
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instruction(opcode: Op, operands: &[u32]) -> Vec<u32> {
        let mut words = vec![(((operands.len() + 1) as u32) << 16) | opcode as u32];
        words.extend_from_slice(operands);
        words
    }

    fn string_words(s: &str) -> Vec<u32> {
        let mut bytes = s.as_bytes().to_vec();
        bytes.push(0);
        while bytes.len() % 4 != 0 {
            bytes.push(0);
        }
        bytes
            .chunks(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    fn module(instructions: &[Vec<u32>]) -> Vec<u32> {
        let mut words = vec![SPIRV_MAGIC, 0x0001_0300, 0, 100, 0];
        for inst in instructions {
            words.extend_from_slice(inst);
        }
        words
    }

    #[test]
    fn collects_named_bindings_sorted_by_set_and_binding() {
        let mut name_op = vec![1u32];
        name_op.extend(string_words("params"));
        let words = module(&[
            instruction(Op::Name, &name_op),
            instruction(Op::Decorate, &[1, Decoration::DescriptorSet as u32, 0]),
            instruction(Op::Decorate, &[1, Decoration::Binding as u32, 2]),
            instruction(Op::Decorate, &[2, Decoration::DescriptorSet as u32, 1]),
            instruction(Op::Decorate, &[2, Decoration::Binding as u32, 0]),
        ]);
        let layout = reflect_spirv("vs_main", ShaderStage::Vertex, &words).unwrap();
        assert_eq!(layout.entry_point, "vs_main");
        assert_eq!(
            layout.bindings,
            vec![
                BindingReflection {
                    name: Some("params".to_string()),
                    set: 0,
                    binding: 2,
                },
                BindingReflection {
                    name: None,
                    set: 1,
                    binding: 0,
                },
            ]
        );
    }

    #[test]
    fn a_binding_without_a_set_defaults_to_set_zero() {
        let words = module(&[instruction(Op::Decorate, &[5, Decoration::Binding as u32, 3])]);
        let layout = reflect_spirv("main", ShaderStage::Compute, &words).unwrap();
        assert_eq!(layout.bindings.len(), 1);
        assert_eq!(layout.bindings[0].set, 0);
        assert_eq!(layout.bindings[0].binding, 3);
    }

    #[test]
    fn entry_point_names_are_checked_when_present() {
        let mut ep_op = vec![0u32, 4];
        ep_op.extend(string_words("vs_main"));
        let words = module(&[instruction(Op::EntryPoint, &ep_op)]);
        assert!(reflect_spirv("vs_main", ShaderStage::Vertex, &words).is_ok());
        let err = reflect_spirv("fs_main", ShaderStage::Fragment, &words).unwrap_err();
        assert!(err.contains("fs_main"));
    }

    #[test]
    fn rejects_a_bad_magic_number() {
        let words = vec![0xdead_beef, 0, 0, 0, 0];
        assert!(reflect_spirv("main", ShaderStage::Vertex, &words).is_err());
    }

    #[test]
    fn rejects_truncated_instruction_streams() {
        let mut words = module(&[]);
        // claims four words but only the opcode is present
        words.push((4u32 << 16) | Op::Decorate as u32);
        assert!(reflect_spirv("main", ShaderStage::Vertex, &words).is_err());
    }
}
