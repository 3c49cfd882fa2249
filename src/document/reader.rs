//! Walks the subnet hierarchy and flattens every entity into [`NetRecords`].
use log::debug;

use super::DocumentError;
use super::entity::{NetRecords, RoleRecord};
use super::markup::Element;
use super::schema::Record;

const SUBNET: &str = "subnet";

/// Every subnet reachable from the document root, in document pre-order.
///
/// Top-level subnets are the root nets; at least one must exist.
pub fn collect_subnets(root: &Element) -> Result<Vec<&Element>, DocumentError> {
    let mut stack: Vec<&Element> = root.children_named(SUBNET).collect();
    if stack.is_empty() {
        return Err(DocumentError::MissingRootNet);
    }
    stack.reverse();

    let mut nets = Vec::new();
    while let Some(net) = stack.pop() {
        nets.push(net);
        let depth = stack.len();
        stack.extend(net.children_named(SUBNET));
        stack[depth..].reverse();
    }
    Ok(nets)
}

pub fn read_records(root: &Element) -> Result<NetRecords, DocumentError> {
    let nets = collect_subnets(root)?;

    let roles = root
        .children_named("roles")
        .flat_map(|roles| roles.children_named("role"))
        .map(typed::<RoleRecord>)
        .collect::<Result<Vec<_>, _>>()?;

    let records = NetRecords {
        roles,
        arcs: entities(&nets, "arc")?,
        places: entities(&nets, "place")?,
        reference_places: entities(&nets, "referencePlace")?,
        transitions: entities(&nets, "transition")?,
    };

    debug!(
        "read {} subnets: {} places, {} reference places, {} transitions, {} arcs, {} roles",
        nets.len(),
        records.places.len(),
        records.reference_places.len(),
        records.transitions.len(),
        records.arcs.len(),
        records.roles.len()
    );
    Ok(records)
}

fn entities<T>(nets: &[&Element], name: &str) -> Result<Vec<T>, DocumentError>
where
    T: for<'a> TryFrom<&'a Record, Error = DocumentError>,
{
    nets.iter()
        .flat_map(|net| net.children_named(name))
        .map(typed::<T>)
        .collect()
}

fn typed<T>(element: &Element) -> Result<T, DocumentError>
where
    T: for<'a> TryFrom<&'a Record, Error = DocumentError>,
{
    T::try_from(&Record::from_element(element)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::markup::parse_document;
    use crate::net::ids::ElementId;

    #[test]
    fn subnets_are_visited_in_document_preorder() {
        let root = parse_document(
            "<document>\
               <subnet><id>1</id>\
                 <subnet><id>2</id><subnet><id>3</id></subnet></subnet>\
                 <subnet><id>4</id></subnet>\
               </subnet>\
               <subnet><id>5</id></subnet>\
             </document>",
        )
        .unwrap();

        let ids: Vec<_> = collect_subnets(&root)
            .unwrap()
            .iter()
            .map(|net| net.children_named("id").next().unwrap().text.clone())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn deeply_nested_subnets_are_flattened() {
        let depth = 10_000;
        let source = format!(
            "<document>{}<place><id>1</id><label>deep</label><tokens>3</tokens></place>\
             <transition><id>2</id><label>drain</label></transition>\
             <arc><sourceId>1</sourceId><destinationId>2</destinationId>\
                  <multiplicity>1</multiplicity><type>regular</type></arc>{}</document>",
            "<subnet>".repeat(depth),
            "</subnet>".repeat(depth)
        );
        let root = parse_document(&source).unwrap();

        assert_eq!(collect_subnets(&root).unwrap().len(), depth);
        let records = read_records(&root).unwrap();
        assert_eq!(records.places.len(), 1);
        assert_eq!(records.arcs.len(), 1);

        let model = crate::compile(&records).unwrap();
        assert_eq!(model.places["deep"].initial, 3);
        assert_eq!(model.transitions["drain"].delta.as_slice(), &[-1]);
    }

    #[test]
    fn missing_root_net_is_malformed() {
        let root = parse_document("<document><roles/></document>").unwrap();
        assert!(matches!(
            read_records(&root),
            Err(DocumentError::MissingRootNet)
        ));
    }

    #[test]
    fn nested_entities_are_flattened() {
        let root = parse_document(
            "<document>\
               <subnet>\
                 <place><id>2</id><label>shared</label><tokens>1</tokens><isStatic>true</isStatic></place>\
                 <subnet>\
                   <referencePlace><id>9</id><connectedPlaceId>2</connectedPlaceId></referencePlace>\
                   <transition><id>5</id><label>t</label></transition>\
                   <arc><sourceId>9</sourceId><destinationId>5</destinationId>\
                        <multiplicity>2</multiplicity><type>regular</type>\
                        <breakPoint><x>1</x><y>1</y></breakPoint></arc>\
                 </subnet>\
               </subnet>\
               <roles><role><name>ops</name><transitionId>5</transitionId></role></roles>\
             </document>",
        )
        .unwrap();

        let records = read_records(&root).unwrap();
        assert_eq!(records.places.len(), 1);
        assert!(records.places[0].is_static);
        assert_eq!(records.places[0].capacity, None);
        assert_eq!(records.reference_places[0].connected_place, ElementId(2));
        assert_eq!(records.transitions[0].label, "t");
        assert_eq!(records.arcs[0].multiplicity, 2);
        assert_eq!(records.roles[0].transition_ids, vec![ElementId(5)]);
    }

    #[test]
    fn non_positive_multiplicity_is_rejected() {
        let root = parse_document(
            "<document><subnet>\
               <arc><sourceId>1</sourceId><destinationId>2</destinationId>\
                    <multiplicity>0</multiplicity><type>regular</type></arc>\
             </subnet></document>",
        )
        .unwrap();
        assert!(matches!(
            read_records(&root),
            Err(DocumentError::InvalidValue { ref field, .. }) if field == "multiplicity"
        ));
    }
}
