use super::{BoardPage, PlatformGroup};
use crate::providers::gtfs::static_data::StaticIndex;

/// Pages needed for `count` trains. A group always occupies at least one
/// page so the display never skips a platform entirely.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size).max(1)
}

/// Split platform groups into fixed-size display pages.
///
/// Page numbers are 1-based within each group; the flat output preserves
/// group order so a page index doubles as a display position.
pub fn paginate(
    groups: &[PlatformGroup],
    page_size: usize,
    index: &StaticIndex,
) -> Vec<BoardPage> {
    let mut pages = Vec::new();
    for group in groups {
        let station = index.station_name(&group.stop_id);
        let total = total_pages(group.trains.len(), page_size);
        for page in 1..=total {
            let start = (page - 1) * page_size;
            let end = (start + page_size).min(group.trains.len());
            pages.push(BoardPage {
                station: station.clone(),
                station_id: group.stop_id.clone(),
                direction: group.direction_label.to_string(),
                line_type: group.line_type.to_string(),
                page,
                total_pages: total,
                trains: group.trains.get(start..end).unwrap_or(&[]).to_vec(),
            });
        }
    }
    pages
}
