//! `wbkit_template` v1:
//! Western Blot quantification template layout kernel.
//!
//! Modules:
//! - `conf`   : layout constants, column map and default format presets
//! - `spec`   : configuration/layout models and the error type
//! - `util`   : pure helper functions
//! - `layout` : configuration resolver, header/row-pair writers, block emitter
//! - `sink`   : sink capability and in-memory sheet buffer
//! - `writer` : `rust_xlsxwriter` backed sink
pub mod conf;
pub mod layout;
pub mod sink;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_ANTIBODY_DEFAULT, C_LOADING_CTRL_DEFAULT, C_TITLE_DEFAULT, EnumFmtKey, EnumTemplateColumn,
    N_CONDITIONS_DEFAULT, derive_default_template_formats,
};
pub use layout::{
    emit_block, generate_template, plan_row_blocks, resolve_template_config, write_header,
    write_row_pair,
};
pub use sink::{EnumCellContent, MemorySink, TemplateSink};
pub use spec::{
    EnumBlockKind, SpecAutofitCellsPolicy, SpecCellFormat, SpecMergeRange, SpecRowBlock,
    SpecRowPair, SpecTemplateArgs, SpecTemplateConfig, SpecTemplateFormats, SpecTemplateReport,
    TemplateError,
};
pub use util::{derive_cell_address, derive_column_letters, derive_range_address};
pub use writer::XlsxTemplateWriter;
