pub mod comment_dto;
pub mod exam_dto;
pub mod review_dto;
pub mod session_dto;
