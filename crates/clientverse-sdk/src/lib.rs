//! clientverse SDK
//!
//! Controllers for the interactive query builder: the query builder session,
//! the condition editor and its lines, the relationship-aware field picker,
//! the list sharing flows and CSV import review. Remote data access goes
//! through the service traits in [`services`].

pub mod condition_line;
pub mod condition_list;
pub mod config;
pub mod csv_import;
pub mod error;
pub mod events;
pub mod field_selector;
pub mod services;
pub mod session;
pub mod sharing;

// Re-export main types
pub use condition_line::ConditionLine;
pub use condition_list::{ConditionEditor, ConditionList};
pub use config::{BuilderConfig, FieldTypeSetting, FieldTypeSettings, Labels};
pub use csv_import::{
    CsvImport, ImportRequest, ImportRow, ImportRowView, ImportStep, MatchType, MergeEdit, MergeRow,
    RowEdit, CSV_DUPLICATE_LABEL,
};
pub use error::{Result, SdkError};
pub use events::{
    ChildWhereInfo, ConditionLineEvent, ConditionPayload, FieldSelectorEvent, Notice, NoticeLevel,
    SessionEvent, WhereInfo,
};
pub use field_selector::FieldSelector;
pub use services::memory::{
    InMemoryImport, InMemoryQueryService, InMemorySchema, InMemorySharing, ListCall,
    RecordingListService,
};
pub use services::{
    ImportService, ListService, QueryService, Record, SchemaService, ServiceError, ServiceResult, SharingService,
};
pub use session::{
    Column, FieldDescriptorView, Frequency, QueryBuilderSession, QueryPreview, SchemaTicket,
    ValueChange,
};
pub use sharing::{
    AccessLevel, AddOutcome, ContactCandidate, DisplayField, MemberChange, MemberRoster, MemberRow,
    MemberStatus, Permissions, ShareAccess, ShareLink, ShareMode, ShareRequest, ShareToken,
    TokenType,
};

// Re-export commonly used types from the lower crates
pub use clientverse_builder::{Direction, OrderBy, QueryBuilder, QueryParts};
pub use clientverse_core::{
    ChildRelationship, Condition, FieldDescriptor, FieldOption, ObjectInfo, ObjectOption, Operator,
    OperatorOption, SelectedFields,
};
pub use clientverse_parser::{ParseError, ParsedQuery, QueryParser};
